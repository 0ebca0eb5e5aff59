//! Trace normalization
//!
//! V8's `--prof` log is a CSV stream whose first field tags the record type.
//! Some records embed filesystem paths, and `--prof-process` cannot resolve
//! backslash-separated paths. The normalizer rewrites only the path field of
//! a whitelisted set of record shapes; numeric fields that happen to contain
//! path-like text are never touched.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{AppError, AppResult};

static V8_RULES: LazyLock<Vec<FixRule>> = LazyLock::new(|| {
    vec![
        FixRule::new(r"^shared-library,", 5, 1).expect("valid shared-library rule"),
        FixRule::new(r"^code-creation,(Script|LazyCompile),", 9, 6)
            .expect("valid code-creation rule"),
        FixRule::new(r"^code-creation,RegExp,", 7, 6).expect("valid regexp rule"),
    ]
});

/// One record shape whose path field gets rewritten
#[derive(Debug, Clone)]
pub struct FixRule {
    pattern: Regex,
    expected_fields: usize,
    field_index: usize,
}

impl FixRule {
    /// Build a rule matching lines against `pattern`
    pub fn new(pattern: &str, expected_fields: usize, field_index: usize) -> AppResult<Self> {
        if field_index >= expected_fields {
            return Err(AppError::Configuration(format!(
                "field index {} out of range for {} fields",
                field_index, expected_fields
            )));
        }

        let pattern = Regex::new(pattern)
            .map_err(|e| AppError::Configuration(format!("invalid trace rule: {}", e)))?;

        Ok(Self {
            pattern,
            expected_fields,
            field_index,
        })
    }
}

/// Counters from a normalization pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeStats {
    pub lines: usize,
    pub rewritten: usize,
}

/// Line-by-line path separator fixer
#[derive(Debug, Clone)]
pub struct TraceNormalizer {
    rules: Vec<FixRule>,
}

impl TraceNormalizer {
    /// Normalizer with an explicit, ordered rule list
    pub fn new(rules: Vec<FixRule>) -> Self {
        Self { rules }
    }

    /// Normalizer for V8 `--prof` logs
    pub fn v8() -> Self {
        Self::new(V8_RULES.clone())
    }

    /// Normalize a single record. `line_number` is 1-based and only used for errors.
    ///
    /// The first rule whose pattern matches decides; a matching record with the
    /// wrong number of fields is rejected rather than partially repaired.
    pub fn normalize_line<'a>(&self, line: &'a str, line_number: usize) -> AppResult<Cow<'a, str>> {
        let Some(rule) = self.rules.iter().find(|r| r.pattern.is_match(line)) else {
            return Ok(Cow::Borrowed(line));
        };

        let mut fields: Vec<Cow<'a, str>> = line.split(',').map(Cow::Borrowed).collect();
        if fields.len() != rule.expected_fields {
            return Err(AppError::MalformedTrace {
                line: line_number,
                expected: rule.expected_fields,
                found: fields.len(),
            });
        }

        if !fields[rule.field_index].contains('\\') {
            return Ok(Cow::Borrowed(line));
        }

        let fixed = fields[rule.field_index].replace('\\', "/");
        fields[rule.field_index] = Cow::Owned(fixed);
        Ok(Cow::Owned(fields.join(",")))
    }

    /// Stream `src` into a new file at `dest`, normalizing every line.
    ///
    /// Line endings become `\n` and a missing final newline stays missing.
    /// Bytes that are not UTF-8 pass through untouched. `src` is never
    /// modified; on failure the partially written `dest` is removed.
    pub async fn normalize_file(&self, src: &Path, dest: &Path) -> AppResult<NormalizeStats> {
        let reader = BufReader::new(File::open(src).await?);
        let writer = BufWriter::new(File::create(dest).await?);

        match self.copy_lines(reader, writer).await {
            Ok(stats) => {
                tracing::debug!(
                    src = %src.display(),
                    dest = %dest.display(),
                    lines = stats.lines,
                    rewritten = stats.rewritten,
                    "Normalized trace"
                );
                Ok(stats)
            }
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(dest).await {
                    tracing::warn!(
                        dest = %dest.display(),
                        error = %remove_err,
                        "Failed to remove partial normalized trace"
                    );
                }
                Err(e)
            }
        }
    }

    async fn copy_lines(
        &self,
        mut reader: BufReader<File>,
        mut writer: BufWriter<File>,
    ) -> AppResult<NormalizeStats> {
        let mut stats = NormalizeStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            stats.lines += 1;

            let terminated = buf.last() == Some(&b'\n');
            let mut end = buf.len() - usize::from(terminated);
            if end > 0 && buf[end - 1] == b'\r' {
                end -= 1;
            }
            let raw = &buf[..end];

            // Rules only look at ASCII tags; bytes of untouched lines go out verbatim
            let text = String::from_utf8_lossy(raw);
            match self.normalize_line(&text, stats.lines)? {
                Cow::Borrowed(_) => writer.write_all(raw).await?,
                Cow::Owned(fixed) => {
                    stats.rewritten += 1;
                    writer.write_all(fixed.as_bytes()).await?;
                }
            }
            if terminated {
                writer.write_all(b"\n").await?;
            }
        }

        writer.flush().await?;
        Ok(stats)
    }
}

impl Default for TraceNormalizer {
    fn default() -> Self {
        Self::v8()
    }
}
