use crate::domain::model::ContractorRecord;
use crate::utils::error::Result;

/// Renders records as a pretty-printed JSON array in input order.
///
/// `serde_json` writes non-ASCII text as-is, so accented names survive
/// without `\u` escapes.
pub struct JsonEmitter;

impl JsonEmitter {
    pub fn render(records: &[ContractorRecord]) -> Result<String> {
        let mut out = serde_json::to_string_pretty(records)?;
        out.push('\n');
        Ok(out)
    }
}
