//! Column alignment of parallel token sequences for log output
//!
//! ```text
//! input  2    cups   flour
//! output QTY  UNIT   NAME
//! ```

use thiserror::Error;

/// Errors raised by [`align_columns`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("Sequence {name} has {found} entries, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Pad every sequence so that its columns line up in a monospace font.
///
/// Each token is followed by `width - len(token) + 1` spaces, where `width`
/// is the longest entry in that column across all sequences. Names are
/// returned in input order.
pub fn align_columns<K, S>(data: &[(K, Vec<S>)]) -> Result<Vec<(K, String)>, AlignError>
where
    K: AsRef<str> + Clone,
    S: AsRef<str>,
{
    let Some((_, first)) = data.first() else {
        return Ok(Vec::new());
    };
    let columns = first.len();

    for (name, seq) in data {
        if seq.len() != columns {
            return Err(AlignError::LengthMismatch {
                name: name.as_ref().to_string(),
                expected: columns,
                found: seq.len(),
            });
        }
    }

    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            data.iter()
                .map(|(_, seq)| display_len(seq[i].as_ref()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    Ok(data
        .iter()
        .map(|(name, seq)| {
            let mut line = String::new();
            for (token, width) in seq.iter().zip(&widths) {
                let token = token.as_ref();
                line.push_str(token);
                line.push_str(&" ".repeat(width - display_len(token) + 1));
            }
            (name.clone(), line)
        })
        .collect())
}

/// Log model input and output side by side, one line each
pub fn log_aligned(words: &[String], preds: &[String]) {
    let data = [("input", words.to_vec()), ("output", preds.to_vec())];

    match align_columns(&data) {
        Ok(lines) => {
            for (_, line) in lines {
                tracing::info!("{}", line);
            }
        }
        Err(e) => tracing::warn!("Cannot align predictions: {}", e),
    }
}

fn display_len(s: &str) -> usize {
    s.chars().count()
}
