//! Root file indirection
//!
//! A root container lists how many data shards a run wrote and a printf-style
//! pattern naming them. Comparing two root files expands into one file pair
//! per shard.

use crate::errors::{invalid_root_file, Result};
use crate::resolver::FilePair;
use restartcheck_core::container::{Buffer, Group};
use restartcheck_core::errors::{ExError, ExErrorKind};
use std::path::Path;
use thiserror::Error;

/// Extension marking a root file
pub const ROOT_EXTENSION: &str = "root";

/// Root entries that are allowed to differ between two runs
pub const ROOT_EXCLUSIONS: [&str; 2] = ["/file_pattern", "/protocol/version"];

/// True iff both resolved paths are root files
pub fn is_root_pair(target: &Path, baseline: &Path) -> bool {
    let is_root = |p: &Path| p.extension().and_then(|e| e.to_str()) == Some(ROOT_EXTENSION);
    is_root(target) && is_root(baseline)
}

/// Reasons a shard template cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template '{template}' has no integer conversion")]
    NoConversion { template: String },

    #[error("template '{template}' has more than one conversion")]
    MultipleConversions { template: String },

    #[error("template '{template}' uses unsupported conversion '%{conversion}'")]
    UnsupportedConversion { template: String, conversion: char },

    #[error("template '{template}' ends inside a conversion")]
    Truncated { template: String },
}

impl From<TemplateError> for ExError {
    fn from(err: TemplateError) -> Self {
        ExError::new(ExErrorKind::InvalidRootFile)
            .with_op("format_shard_name")
            .with_message(err.to_string())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    width: usize,
}

impl Spec {
    fn render(&self, value: u64) -> String {
        let sign = if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        };
        let digits = value.to_string();
        let len = sign.len() + digits.len();
        if len >= self.width {
            return format!("{}{}", sign, digits);
        }
        let pad = self.width - len;
        if self.left {
            format!("{}{}{}", sign, digits, " ".repeat(pad))
        } else if self.zero {
            format!("{}{}{}", sign, "0".repeat(pad), digits)
        } else {
            format!("{}{}{}", " ".repeat(pad), sign, digits)
        }
    }
}

/// Substitute `value` into a printf-style template with exactly one integer
/// conversion (`%d`, `%i` or `%u` with flags `0 - + space` and a width).
/// `%%` is a literal percent sign.
pub fn format_shard_name(template: &str, value: u64) -> std::result::Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + 8);
    let mut converted = false;
    let mut chars = template.chars().peekable();
    let truncated = || TemplateError::Truncated {
        template: template.to_string(),
    };

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                _ => break,
            }
            chars.next();
        }
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            spec.width = spec.width * 10 + d as usize;
            chars.next();
        }

        match chars.next() {
            Some('d' | 'i' | 'u') => {
                if converted {
                    return Err(TemplateError::MultipleConversions {
                        template: template.to_string(),
                    });
                }
                converted = true;
                out.push_str(&spec.render(value));
            }
            Some(other) => {
                return Err(TemplateError::UnsupportedConversion {
                    template: template.to_string(),
                    conversion: other,
                })
            }
            None => return Err(truncated()),
        }
    }

    if !converted {
        return Err(TemplateError::NoConversion {
            template: template.to_string(),
        });
    }
    Ok(out)
}

/// The shard listing of a root container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootInfo {
    pub number_of_files: u64,
    pub file_pattern: String,
}

/// Read `number_of_files` and `file_pattern` from a root container
pub fn read_root_info(root: &Group) -> Result<RootInfo> {
    let count = root
        .dataset("number_of_files")
        .ok_or_else(|| invalid_root_file("root file has no 'number_of_files' dataset"))?;
    let first = count
        .value
        .to_i128()
        .and_then(|v| v.first().copied())
        .ok_or_else(|| invalid_root_file("'number_of_files' must hold at least one integer"))?;
    let number_of_files = u64::try_from(first)
        .map_err(|_| invalid_root_file(format!("'number_of_files' is negative: {}", first)))?;

    let pattern = root
        .dataset("file_pattern")
        .ok_or_else(|| invalid_root_file("root file has no 'file_pattern' dataset"))?;
    let joined = match &pattern.value.data {
        Buffer::Str(parts) => parts.concat(),
        Buffer::Uint(bytes) => bytes.iter().map(|&b| char::from(b as u8)).collect(),
        Buffer::Int(bytes) => bytes.iter().map(|&b| char::from(b as u8)).collect(),
        Buffer::Opaque(bytes) => bytes.iter().map(|&b| char::from(b)).collect(),
        Buffer::Float(_) | Buffer::Bool(_) => {
            return Err(invalid_root_file(format!(
                "'file_pattern' must be a string, found {}",
                pattern.value.dtype
            )))
        }
    };

    Ok(RootInfo {
        number_of_files,
        file_pattern: joined.trim_end_matches('\0').to_string(),
    })
}

/// One pair per shard, each shard path joined to its root file's directory
pub fn expand_shards(
    target_root: &Path,
    target: &RootInfo,
    baseline_root: &Path,
    baseline: &RootInfo,
) -> Result<Vec<FilePair>> {
    let target_dir = target_root.parent().unwrap_or_else(|| Path::new(""));
    let baseline_dir = baseline_root.parent().unwrap_or_else(|| Path::new(""));

    (0..target.number_of_files)
        .map(|i| {
            Ok(FilePair {
                index: i as usize,
                target: target_dir.join(format_shard_name(&target.file_pattern, i)?),
                baseline: baseline_dir.join(format_shard_name(&baseline.file_pattern, i)?),
            })
        })
        .collect()
}
