use super::model::{LoaderConfig, ParseOutcome, SkippedRow, StoppingPowerSample, StoppingPowerTable};
use super::units::{EnergyUnit, PathFamily, StoppingUnit};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(
        "no tabulated stopping-power rows found; expected lines like '10.00 keV   1.234E+02'"
    )]
    NoDataRegionFound,
    #[error("stopping-power table has no valid rows ({skipped} rows skipped)")]
    EmptyTable { skipped: usize },
    #[error("line {line}: unrecognized unit '{token}'")]
    UnrecognizedUnit { line: usize, token: String },
    #[error("line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
    #[error("line {line}: stopping unit is {found} but the table is {expected}")]
    InconsistentUnitFamily {
        line: usize,
        expected: PathFamily,
        found: PathFamily,
    },
    #[error(
        "stopping-power table needs at least {} distinct energies, found {count}",
        StoppingPowerTable::MIN_SAMPLES
    )]
    TooFewSamples { count: usize },
}

impl ParseError {
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::NoDataRegionFound => "INPUT.TABLE_NO_DATA",
            Self::EmptyTable { .. } => "INPUT.TABLE_EMPTY",
            Self::UnrecognizedUnit { .. } => "INPUT.TABLE_UNIT",
            Self::MalformedRow { .. } => "INPUT.TABLE_ROW",
            Self::InconsistentUnitFamily { .. } => "INPUT.TABLE_UNIT_FAMILY",
            Self::TooFewSamples { .. } => "INPUT.TABLE_TOO_FEW_SAMPLES",
        }
    }
}

/// Parse raw stopping-power text with the default [`LoaderConfig`].
pub fn parse_stopping_power_table(raw_text: &str) -> Result<StoppingPowerTable, ParseError> {
    parse_with_diagnostics(raw_text, &LoaderConfig::default()).map(|outcome| outcome.table)
}

/// Parse raw stopping-power text, returning the table together with every row
/// that was dropped and the reason it was dropped.
pub fn parse_with_diagnostics(
    raw_text: &str,
    config: &LoaderConfig,
) -> Result<ParseOutcome, ParseError> {
    let lines = raw_text.lines().collect::<Vec<_>>();
    let region = locate_data_region(&lines).ok_or(ParseError::NoDataRegionFound)?;
    tracing::debug!(
        start_line = region.start + 1,
        end_line = region.end,
        mode = ?region.mode,
        "located stopping-power data region"
    );

    let table_unit = match declared_stopping_unit(&lines[..region.start]) {
        None => Ok(config.default_stopping_unit),
        Some(token) => StoppingUnit::from_token(token).ok_or(token),
    };
    match table_unit {
        Ok(unit) => tracing::debug!(unit = %unit, "stopping-power unit"),
        Err(token) => tracing::warn!(token, "declared stopping unit is not recognized"),
    }

    let mut family = table_unit.ok().map(StoppingUnit::family);
    let mut samples = Vec::new();
    let mut skipped = Vec::new();

    for (index, line) in lines[region.start..region.end].iter().enumerate() {
        let line_number = region.start + index + 1;
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(line, line_number, table_unit, &mut family) {
            Ok(sample) => samples.push(sample),
            Err(error) => {
                tracing::debug!(line = line_number, %error, "skipping stopping-power row");
                skipped.push(SkippedRow {
                    line: line_number,
                    error,
                });
            }
        }
    }

    if samples.is_empty() {
        return Err(ParseError::EmptyTable {
            skipped: skipped.len(),
        });
    }

    let family = family.unwrap_or_else(|| config.default_stopping_unit.family());
    let table = StoppingPowerTable::from_normalized(samples, family)?;
    tracing::info!(
        samples = table.len(),
        skipped = skipped.len(),
        max_energy_mev = table.max_energy(),
        "parsed stopping-power table"
    );

    Ok(ParseOutcome { table, skipped })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegionMode {
    ColumnHeader,
    RowScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DataRegion {
    start: usize,
    end: usize,
    mode: RegionMode,
}

fn locate_data_region(lines: &[&str]) -> Option<DataRegion> {
    locate_by_column_header(lines).or_else(|| locate_by_row_scan(lines))
}

/// SRIM-style layout: a column header naming `Energy` and `Elec.`, a dashed
/// separator, then rows until a blank line, another separator or the unit
/// trailer.
fn locate_by_column_header(lines: &[&str]) -> Option<DataRegion> {
    let header = lines
        .iter()
        .position(|line| line.contains("Energy") && line.contains("Elec"))?;

    let start = lines[header + 1..]
        .iter()
        .position(|line| is_separator(line.trim()))
        .map_or(header + 1, |offset| header + 1 + offset + 1);

    let mut end = lines.len();
    let mut saw_content = false;
    for (index, line) in lines.iter().enumerate().skip(start) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if saw_content {
                end = index;
                break;
            }
            continue;
        }
        if is_separator(trimmed) {
            if saw_content {
                end = index;
                break;
            }
            continue;
        }
        if is_trailer(trimmed) {
            end = index;
            break;
        }
        saw_content = true;
    }

    let has_rows = lines[start..end].iter().any(|line| is_tabulated_row(line));
    has_rows.then_some(DataRegion {
        start,
        end,
        mode: RegionMode::ColumnHeader,
    })
}

/// Header-less layout: the region starts at the first tabulated row and runs
/// to the next separator or trailer. Blank and malformed lines inside it are
/// skipped later.
fn locate_by_row_scan(lines: &[&str]) -> Option<DataRegion> {
    let start = lines.iter().position(|line| is_tabulated_row(line))?;
    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| {
            let trimmed = line.trim();
            is_separator(trimmed) || is_trailer(trimmed)
        })
        .map_or(lines.len(), |(index, _)| index);

    Some(DataRegion {
        start,
        end,
        mode: RegionMode::RowScan,
    })
}

fn is_separator(trimmed: &str) -> bool {
    !trimmed.is_empty()
        && trimmed.starts_with(['-', '='])
        && trimmed
            .chars()
            .all(|ch| matches!(ch, '-' | '=') || ch.is_whitespace())
}

fn is_trailer(trimmed: &str) -> bool {
    trimmed.starts_with("Multiply") || (trimmed.contains("Stopping") && trimmed.contains("Units"))
}

/// A number (optionally with its unit glued on) followed by an alphabetic
/// token ending in `eV`.
fn is_tabulated_row(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return false;
    };

    let (number, suffix) = split_numeric_prefix(first);
    if !number.starts_with(|ch: char| ch.is_ascii_digit() || ch == '.')
        || parse_number(number).is_none()
    {
        return false;
    }

    let unit = if suffix.is_empty() {
        tokens.next().unwrap_or("")
    } else {
        suffix
    };

    !unit.is_empty()
        && unit.chars().all(|ch| ch.is_ascii_alphabetic())
        && unit.to_ascii_lowercase().ends_with("ev")
}

fn declared_stopping_unit<'a>(header_lines: &[&'a str]) -> Option<&'a str> {
    header_lines.iter().find_map(|line| {
        let lower = line.to_ascii_lowercase();
        if !lower.contains("stopping units") {
            return None;
        }
        line.split_once('=').map(|(_, unit)| unit.trim())
    })
}

fn parse_row(
    line: &str,
    line_number: usize,
    table_unit: Result<StoppingUnit, &str>,
    family: &mut Option<PathFamily>,
) -> Result<StoppingPowerSample, ParseError> {
    let malformed = |reason: String| ParseError::MalformedRow {
        line: line_number,
        reason,
    };
    let unrecognized = |token: &str| ParseError::UnrecognizedUnit {
        line: line_number,
        token: token.to_string(),
    };

    let tokens = line.split_whitespace().collect::<Vec<_>>();
    let Some(first) = tokens.first() else {
        return Err(malformed("empty row".to_string()));
    };

    let (energy_text, glued_unit) = split_numeric_prefix(first);
    let (energy_unit_text, next) = if glued_unit.is_empty() {
        let unit = tokens
            .get(1)
            .ok_or_else(|| malformed(format!("missing energy unit after '{first}'")))?;
        (*unit, 2)
    } else {
        (glued_unit, 1)
    };

    let energy_value = parse_number(energy_text)
        .ok_or_else(|| malformed(format!("invalid energy value '{first}'")))?;
    let energy_unit =
        EnergyUnit::from_token(energy_unit_text).ok_or_else(|| unrecognized(energy_unit_text))?;

    let stopping_token = tokens
        .get(next)
        .ok_or_else(|| malformed("missing electronic stopping power column".to_string()))?;
    let (stopping_text, stopping_suffix) = split_numeric_prefix(stopping_token);
    let stopping_value = parse_number(stopping_text)
        .ok_or_else(|| malformed(format!("invalid stopping power '{stopping_token}'")))?;

    let row_unit_text = if !stopping_suffix.is_empty() {
        if !stopping_suffix.contains('/') {
            return Err(malformed(format!(
                "invalid stopping power '{stopping_token}'"
            )));
        }
        Some(stopping_suffix)
    } else {
        tokens
            .get(next + 1)
            .copied()
            .filter(|token| token.contains('/'))
    };

    let stopping_unit = match row_unit_text {
        Some(text) => StoppingUnit::from_token(text).ok_or_else(|| unrecognized(text))?,
        None => table_unit.map_err(unrecognized)?,
    };

    // Only rows that will be kept may fix the table's unit family.
    if energy_value < 0.0 {
        return Err(malformed(format!("negative energy {energy_value}")));
    }
    if stopping_value < 0.0 {
        return Err(malformed(format!("negative stopping power {stopping_value}")));
    }

    match *family {
        Some(expected) if expected != stopping_unit.family() => {
            return Err(ParseError::InconsistentUnitFamily {
                line: line_number,
                expected,
                found: stopping_unit.family(),
            });
        }
        Some(_) => {}
        None => *family = Some(stopping_unit.family()),
    }

    Ok(StoppingPowerSample::new(
        energy_unit.to_mev(energy_value),
        stopping_unit.to_canonical(stopping_value),
    ))
}

/// Split `"10.5keV"` into `("10.5", "keV")`. Exponents (`1.2E+03`) stay in the
/// numeric part.
fn split_numeric_prefix(token: &str) -> (&str, &str) {
    let bytes = token.as_bytes();
    let mut end = 0;
    while end < bytes.len() {
        let byte = bytes[end];
        let follows_mantissa = end > 0 && (bytes[end - 1].is_ascii_digit() || bytes[end - 1] == b'.');
        let is_exponent = matches!(byte, b'e' | b'E')
            && follows_mantissa
            && bytes
                .get(end + 1)
                .is_some_and(|next| next.is_ascii_digit() || matches!(next, b'+' | b'-'));
        if byte.is_ascii_digit() || matches!(byte, b'.' | b',' | b'+' | b'-') || is_exponent {
            end += 1;
        } else {
            break;
        }
    }
    token.split_at(end)
}

/// Finite float with `,` accepted as the decimal separator.
fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::{
        ParseError, is_separator, is_tabulated_row, parse_stopping_power_table,
        parse_with_diagnostics, split_numeric_prefix,
    };
    use crate::table::model::{LoaderConfig, ParseOutcome};
    use crate::table::units::{EnergyUnit, PathFamily, PathUnit, StoppingUnit};

    fn energies(text: &str) -> Vec<f64> {
        parse_stopping_power_table(text)
            .expect("table should parse")
            .samples()
            .iter()
            .map(|sample| sample.energy)
            .collect()
    }

    fn energies_of(outcome: &ParseOutcome) -> Vec<f64> {
        outcome
            .table
            .samples()
            .iter()
            .map(|sample| sample.energy)
            .collect()
    }

    #[test]
    fn numeric_prefix_keeps_exponents_and_splits_units() {
        assert_eq!(split_numeric_prefix("10.00keV"), ("10.00", "keV"));
        assert_eq!(split_numeric_prefix("1.234E+02"), ("1.234E+02", ""));
        assert_eq!(split_numeric_prefix("5E-3"), ("5E-3", ""));
        assert_eq!(split_numeric_prefix("10eV"), ("10", "eV"));
        assert_eq!(split_numeric_prefix("2.5MeV/mm"), ("2.5", "MeV/mm"));
        assert_eq!(split_numeric_prefix("keV"), ("", "keV"));
    }

    #[test]
    fn row_detection_requires_number_and_ev_unit() {
        assert!(is_tabulated_row("10.00 keV   1.234E+02  5.6E-01"));
        assert!(is_tabulated_row("  2MeV 5"));
        assert!(is_tabulated_row("3 TeV 1.0"));
        assert!(!is_tabulated_row("  Energy      Elec.      Nuclear"));
        assert!(!is_tabulated_row("520 A 123 A"));
        assert!(!is_tabulated_row(""));
        assert!(is_separator("-----------  ---------- ----------"));
        assert!(is_separator("======"));
        assert!(!is_separator("-1 MeV 5"));
    }

    #[test]
    fn headerless_rows_mix_energy_units() {
        let text = "10 eV 0.5\n500 keV 4.0\n1 MeV 5.0\n0.002 GeV 5.0\n";
        let parsed = energies(text);
        let expected = [1.0e-5, 0.5, 1.0, 2.0];
        assert_eq!(parsed.len(), expected.len());
        for (actual, expected) in parsed.iter().zip(expected) {
            assert!((actual - expected).abs() <= 1.0e-15, "{actual} vs {expected}");
        }
    }

    #[test]
    fn kev_rows_normalize_like_their_mev_spelling() {
        let mixed =
            parse_stopping_power_table("500 keV 4.0\n750 keV 4.5\n1 MeV 5.0\n2 MeV 5.0\n")
                .expect("mixed table should parse");
        let all_mev =
            parse_stopping_power_table("0.5 MeV 4.0\n0.75 MeV 4.5\n1 MeV 5.0\n2 MeV 5.0\n")
                .expect("MeV table should parse");
        assert_eq!(mixed.samples(), all_mev.samples());
    }

    #[test]
    fn energy_units_are_case_sensitive() {
        let outcome =
            parse_with_diagnostics("500 meV 1.0\n1 MeV 5\n2 MeV 5\n", &LoaderConfig::default())
                .expect("table should parse");

        assert_eq!(energies_of(&outcome), [1.0, 2.0]);
        assert_eq!(outcome.table.max_energy(), 2.0);
        assert_eq!(
            outcome.skipped[0].error,
            ParseError::UnrecognizedUnit {
                line: 1,
                token: "meV".to_string()
            }
        );
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[test]
    fn rejected_rows_do_not_fix_the_unit_family() {
        let text = " Stopping Units =  L.S.S. reduced units\n\
                    1 MeV -5 MeV/(mg/cm2)\n\
                    2 MeV 5 MeV/mm\n\
                    3 MeV 6 MeV/mm\n";
        let outcome =
            parse_with_diagnostics(text, &LoaderConfig::default()).expect("table should parse");

        assert_eq!(outcome.table.len(), 2);
        assert_eq!(outcome.table.path_family(), PathFamily::Length);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            outcome.skipped[0].error,
            ParseError::MalformedRow { line: 2, .. }
        ));
    }

    #[test]
    fn unordered_rows_are_sorted_and_deduplicated() {
        let table = parse_stopping_power_table("2 MeV 5\n1 MeV 4\n1000 keV 9\n0 MeV 0\n")
            .expect("table should parse");
        let samples = table.samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].energy, 1.0);
        assert_eq!(samples[1].stopping_power, 4.0);
    }

    #[test]
    fn malformed_and_unknown_unit_rows_are_reported_not_fatal() {
        let text = "0 MeV 0\n1 MeV 5\n1.x MeV 3\n2 TeV 5\n3 MeV abc\n4 MeV 6\n";
        let outcome =
            parse_with_diagnostics(text, &LoaderConfig::default()).expect("table should parse");

        assert_eq!(outcome.table.len(), 3);
        let lines: Vec<usize> = outcome.skipped.iter().map(|row| row.line).collect();
        assert_eq!(lines, [3, 4, 5]);
        assert!(matches!(
            outcome.skipped[0].error,
            ParseError::MalformedRow { line: 3, .. } | ParseError::UnrecognizedUnit { line: 3, .. }
        ));
        assert_eq!(
            outcome.skipped[1].error,
            ParseError::UnrecognizedUnit {
                line: 4,
                token: "TeV".to_string()
            }
        );
        assert!(matches!(
            outcome.skipped[2].error,
            ParseError::MalformedRow { line: 5, .. }
        ));
    }

    #[test]
    fn negative_values_are_malformed_rows() {
        let outcome = parse_with_diagnostics(
            "0 MeV 0\n1 MeV -5\n2 MeV 5\n3 MeV 6\n",
            &LoaderConfig::default(),
        )
        .expect("table should parse");
        assert_eq!(outcome.table.len(), 3);
        assert!(matches!(
            outcome.skipped[0].error,
            ParseError::MalformedRow { line: 2, .. }
        ));
    }

    #[test]
    fn text_without_rows_has_no_data_region() {
        let error = parse_stopping_power_table("SRIM output\nnothing tabulated here\n")
            .expect_err("no region should fail");
        assert_eq!(error, ParseError::NoDataRegionFound);
        assert_eq!(
            parse_stopping_power_table(""),
            Err(ParseError::NoDataRegionFound)
        );
    }

    #[test]
    fn rows_that_all_fail_give_an_empty_table() {
        let error = parse_stopping_power_table("1.0 keV abc\n2.0 keV xyz\n")
            .expect_err("no valid rows should fail");
        assert_eq!(error, ParseError::EmptyTable { skipped: 2 });
    }

    #[test]
    fn single_valid_row_is_too_few() {
        let error =
            parse_stopping_power_table("1.0 MeV 3.0\n").expect_err("one row should fail");
        assert_eq!(error, ParseError::TooFewSamples { count: 1 });
    }

    #[test]
    fn declared_stopping_unit_is_applied_to_every_row() {
        let text = "\
 Stopping Units =  keV / micron
   Ion        dE/dx      dE/dx
  Energy      Elec.      Nuclear
-----------  ---------- ----------
100.00 keV   2.000E+01  1.000E-01
  1.00 MeV   8.000E+01  2.000E-02
-----------------------------------------------------------
 Multiply Stopping by        for Stopping Units
";
        let table = parse_stopping_power_table(text).expect("table should parse");
        assert_eq!(table.len(), 2);
        assert_eq!(table.path_family(), PathFamily::Length);
        assert!((table.samples()[0].stopping_power - 20.0).abs() < 1.0e-12);
        assert!((table.samples()[1].stopping_power - 80.0).abs() < 1.0e-12);
    }

    #[test]
    fn mass_thickness_tables_keep_their_family() {
        let text = " Stopping Units =  MeV / (mg/cm2)\n1 MeV 0.5\n2 MeV 0.4\n";
        let table = parse_stopping_power_table(text).expect("table should parse");
        assert_eq!(table.path_family(), PathFamily::MassThickness);
        assert_eq!(
            table.stopping_unit(),
            StoppingUnit::new(
                EnergyUnit::MegaElectronVolt,
                PathUnit::MilligramPerSquareCentimeter
            )
        );
    }

    #[test]
    fn per_row_units_override_and_mixed_families_are_skipped() {
        let text = "0 MeV 0 MeV/mm\n1 MeV 5keV/micron\n2 MeV 5 MeV/(mg/cm2)\n3 MeV 6 MeV/mm\n";
        let outcome =
            parse_with_diagnostics(text, &LoaderConfig::default()).expect("table should parse");
        assert_eq!(outcome.table.len(), 3);
        assert!((outcome.table.samples()[1].stopping_power - 5.0).abs() < 1.0e-12);
        assert_eq!(
            outcome.skipped[0].error,
            ParseError::InconsistentUnitFamily {
                line: 3,
                expected: PathFamily::Length,
                found: PathFamily::MassThickness,
            }
        );
    }

    #[test]
    fn unparseable_declared_unit_skips_rows_without_their_own_unit() {
        let text = " Stopping Units =  L.S.S. reduced units\n1 MeV 0.5\n2 MeV 0.4\n";
        let error = parse_stopping_power_table(text).expect_err("unknown unit should fail");
        assert_eq!(error, ParseError::EmptyTable { skipped: 2 });
    }

    #[test]
    fn decimal_commas_are_accepted() {
        let table = parse_stopping_power_table("10,00 keV 1,500E+01\n1,0 MeV 2,0E+01\n")
            .expect("table should parse");
        assert!((table.samples()[0].energy - 0.01).abs() < 1.0e-15);
        assert!((table.samples()[0].stopping_power - 15.0).abs() < 1.0e-12);
    }

    #[test]
    fn loader_config_supplies_the_default_unit() {
        let config = LoaderConfig {
            default_stopping_unit: StoppingUnit::new(
                EnergyUnit::KiloElectronVolt,
                PathUnit::Millimeter,
            ),
        };
        let outcome =
            parse_with_diagnostics("0 MeV 0\n1 MeV 500\n", &config).expect("table should parse");
        assert!((outcome.table.samples()[1].stopping_power - 0.5).abs() < 1.0e-12);
    }
}
