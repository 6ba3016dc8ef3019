// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Block value readers.
//!
//! Values arrive one block per row in grid order. A file may hold several
//! realizations back to back; every realization covers the whole grid.
//! Gzip input is detected from its magic bytes, not the file name.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use tracing::info;

use crate::error::ModelError;
use crate::params::{InputFormat, InputParams};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Opens `path`, transparently decompressing gzip content.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, ModelError> {
    let mut file = BufReader::new(File::open(path)?);
    let gzipped = file.fill_buf()?.starts_with(&GZIP_MAGIC);
    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

/// Reads every realization from `path` as described by `input`.
pub fn read_block_values(path: &Path, input: &InputParams) -> Result<Vec<Vec<f64>>, ModelError> {
    let blocks = input.grid.validate()?;
    let reader = open_input(path)?;
    let realizations = match input.format()? {
        InputFormat::GeoEas => read_geoeas(reader, input.ebv_column, blocks)?,
        InputFormat::GzipColumn => read_column(reader, blocks)?,
    };
    info!(
        path = %path.display(),
        realizations = realizations.len(),
        blocks,
        "read block values"
    );
    Ok(realizations)
}

/// GEO-EAS text: a title line, the variable count, one name per variable,
/// then whitespace separated rows. `column` is 1-based.
pub fn read_geoeas<R: BufRead>(
    reader: R,
    column: usize,
    blocks: usize,
) -> Result<Vec<Vec<f64>>, ModelError> {
    let mut lines = reader.lines().enumerate();
    let mut header = |what: &str| -> Result<(usize, String), ModelError> {
        match lines.next() {
            Some((n, line)) => Ok((n + 1, line?)),
            None => Err(ModelError::Parse {
                line: 0,
                reason: format!("missing {what}"),
            }),
        }
    };

    header("title")?;
    let (line, count) = header("variable count")?;
    let variables: usize = count
        .split_whitespace()
        .next()
        .and_then(|tok| tok.parse().ok())
        .ok_or_else(|| ModelError::Parse {
            line,
            reason: format!("expected a variable count, found {count:?}"),
        })?;
    for _ in 0..variables {
        header("variable name")?;
    }
    if column == 0 || column > variables {
        return Err(ModelError::EbvColumn {
            column,
            available: variables,
        });
    }

    let mut values = Vec::new();
    for (n, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let token = line
            .split_whitespace()
            .nth(column - 1)
            .ok_or_else(|| ModelError::Parse {
                line: n + 1,
                reason: format!("expected {variables} columns"),
            })?;
        values.push(parse_value(token, n + 1)?);
    }
    split_realizations(values, blocks)
}

/// Headerless input with one value per line.
pub fn read_column<R: BufRead>(reader: R, blocks: usize) -> Result<Vec<Vec<f64>>, ModelError> {
    let mut values = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        values.push(parse_value(token, n + 1)?);
    }
    split_realizations(values, blocks)
}

fn parse_value(token: &str, line: usize) -> Result<f64, ModelError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(ModelError::Parse {
            line,
            reason: format!("non-finite value {token:?}"),
        }),
        Err(_) => Err(ModelError::Parse {
            line,
            reason: format!("not a number: {token:?}"),
        }),
    }
}

fn split_realizations(values: Vec<f64>, blocks: usize) -> Result<Vec<Vec<f64>>, ModelError> {
    if values.is_empty() || blocks == 0 {
        return Err(ModelError::NoData);
    }
    if values.len() % blocks != 0 {
        return Err(ModelError::PartialRealization {
            values: values.len(),
            blocks,
        });
    }
    Ok(values.chunks(blocks).map(<[f64]>::to_vec).collect())
}
