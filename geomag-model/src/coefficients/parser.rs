//! Whitespace-delimited coefficient files (`WMM.COF` and relatives).
//!
//! ```text
//!     2020.0  WMM-2020  2019.756  12/10/2019       header
//!   1  0  -29404.5       0.0        6.7        0.0   n m g h g_sv h_sv
//!   1  1   -1450.7    4652.9        7.7      -25.1
//!   ...
//! 999999999999999999999999999999999999999999999999   footer
//! ```
//!
//! The first non-blank line is the header (see [`ModelHeader::parse`]). Data lines carry
//! optional degree/order columns followed by `g h` and, when secular variation is loaded,
//! `g_sv h_sv`. The first line with fewer fields than a data line ends the table.
//!
//! Multi-epoch files key their sections by a label whose second field is `YYYY.0`; with
//! [`LoadOptions::load_year`] set, only the rows between that label and the next year's label
//! are read.

use geomag_core::{GeomagError, GeomagResult};

use super::{degree_order, term_count, CoefficientTable, ModelHeader};

/// Controls how coefficient text is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadOptions {
    /// Data lines start with integer degree and order columns.
    pub skip_degree_columns: bool,
    /// Read the `g_sv h_sv` columns. Without them every rate is zero.
    pub load_sv: bool,
    /// Stop after this degree.
    pub end_degree: Option<usize>,
    /// Section to read from a multi-epoch file.
    pub load_year: Option<i32>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            skip_degree_columns: true,
            load_sv: true,
            end_degree: None,
            load_year: None,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_end_degree(mut self, degree: usize) -> Self {
        self.end_degree = Some(degree);
        self
    }

    pub fn with_load_year(mut self, year: i32) -> Self {
        self.load_year = Some(year);
        self
    }

    pub fn without_degree_columns(mut self) -> Self {
        self.skip_degree_columns = false;
        self
    }

    pub fn without_secular_variation(mut self) -> Self {
        self.load_sv = false;
        self
    }

    /// Number of value columns on a data line; shorter lines end the table.
    #[inline]
    pub fn footer_width(&self) -> usize {
        if self.load_sv {
            4
        } else {
            2
        }
    }

    fn value_offset(&self) -> usize {
        if self.skip_degree_columns {
            2
        } else {
            0
        }
    }
}

fn is_section_label(fields: &[&str], year: i32) -> bool {
    fields.get(1).is_some_and(|f| *f == format!("{}.0", year))
}

#[derive(Default)]
struct Columns {
    g: Vec<f64>,
    h: Vec<f64>,
    g_sv: Vec<f64>,
    h_sv: Vec<f64>,
}

impl Columns {
    fn len(&self) -> usize {
        self.g.len()
    }

    fn push(&mut self, row: [f64; 4]) {
        self.g.push(row[0]);
        self.h.push(row[1]);
        self.g_sv.push(row[2]);
        self.h_sv.push(row[3]);
    }
}

/// Parses coefficient text into a table.
///
/// # Errors
///
/// - [`GeomagError::MalformedCoefficientData`] for a bad header, a non-numeric field, a
///   degree/order column out of sequence, a missing footer line, or a row count that is not a
///   complete set of degrees.
/// - [`GeomagError::YearNotFound`] when [`LoadOptions::load_year`] names a section the text
///   does not contain.
pub fn parse_coefficients(content: &str, options: &LoadOptions) -> GeomagResult<CoefficientTable> {
    let width = options.footer_width();
    let offset = options.value_offset();
    let max_terms = options.end_degree.map(term_count);

    let mut header: Option<ModelHeader> = None;
    let mut section_epoch: Option<f64> = None;
    let mut in_section = options.load_year.is_none();
    let mut terminated = false;
    let mut last_line = 0;
    let mut columns = Columns::default();

    for (i, raw) in content.lines().enumerate() {
        let line = i + 1;
        last_line = line;
        let fields: Vec<&str> = raw.split_whitespace().collect();

        if header.is_none() {
            if !fields.is_empty() {
                header = Some(ModelHeader::parse(&fields, line)?);
            }
            continue;
        }

        if let Some(year) = options.load_year {
            if is_section_label(&fields, year) {
                in_section = true;
                section_epoch = Some(year as f64);
                continue;
            }
            if in_section && is_section_label(&fields, year + 1) {
                terminated = true;
                break;
            }
        }

        if fields.len() < width {
            if in_section {
                terminated = true;
                break;
            }
            continue;
        }
        if !in_section {
            continue;
        }
        if max_terms.is_some_and(|max| columns.len() >= max) {
            terminated = true;
            break;
        }
        if fields.len() < offset + width {
            return Err(GeomagError::malformed(
                line,
                format!(
                    "expected {} columns, found {}",
                    offset + width,
                    fields.len()
                ),
            ));
        }

        let mut row = [0.0; 4];
        for (k, value) in row.iter_mut().take(width).enumerate() {
            let text = fields[offset + k];
            *value = text.parse::<f64>().map_err(|_| {
                GeomagError::malformed(line, format!("'{}' is not a number", text))
            })?;
        }

        let degree_columns = if options.skip_degree_columns {
            Some(parse_degree_order(&fields, line)?)
        } else {
            None
        };

        if columns.len() == 0 {
            let has_monopole = match degree_columns {
                Some(nm) => nm == (0, 0),
                None => row[0] == 0.0 && row[1] == 0.0,
            };
            if !has_monopole {
                columns.push([0.0; 4]);
            }
        }

        if let Some((n, m)) = degree_columns {
            let expected = degree_order(columns.len());
            if (n, m) != expected {
                return Err(GeomagError::malformed(
                    line,
                    format!(
                        "degree {} order {} out of sequence, expected degree {} order {}",
                        n, m, expected.0, expected.1
                    ),
                ));
            }
        }

        columns.push(row);
    }

    let header =
        header.ok_or_else(|| GeomagError::malformed(last_line, "no header line found"))?;
    if let Some(year) = options.load_year {
        if section_epoch.is_none() {
            return Err(GeomagError::year_not_found(year));
        }
    }
    if !terminated {
        return Err(GeomagError::malformed(
            last_line,
            "coefficient table ends without a footer line",
        ));
    }

    let header = ModelHeader {
        epoch: section_epoch.unwrap_or(header.epoch),
        ..header
    };

    let Columns { g, h, g_sv, h_sv } = columns;
    let table = CoefficientTable::new(header, g, h, g_sv, h_sv).map_err(|e| match e {
        GeomagError::MalformedCoefficientData { message, .. } => {
            GeomagError::malformed(last_line, message)
        }
        other => other,
    })?;

    tracing::debug!(
        epoch = table.epoch(),
        nmax = table.nmax(),
        secular_variation = options.load_sv,
        "Parsed coefficient table"
    );
    Ok(table)
}

fn parse_degree_order(fields: &[&str], line: usize) -> GeomagResult<(usize, usize)> {
    let parse = |text: &str| {
        text.parse::<usize>().map_err(|_| {
            GeomagError::malformed(line, format!("'{}' is not a degree/order integer", text))
        })
    };
    Ok((parse(fields[0])?, parse(fields[1])?))
}
