use serde_json::json;

use crate::error::Result;
use crate::privacy::MaskingEngine;

/// One-shot masking of a text argument, for local inspection of what the
/// reasoning stages would see.
pub fn run(text: &str, as_json: bool) -> Result<()> {
    let engine = MaskingEngine::new();
    let (masked, table) = engine.mask(text);

    if as_json {
        let payload = json!({"masked": masked, "mapping": table});
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{masked}");
    if table.is_empty() {
        eprintln!("concierge: no sensitive spans detected.");
    } else {
        eprintln!("concierge: {} span(s) masked:", table.len());
        for (token, entry) in table.iter() {
            eprintln!("  {token} <- {} ({})", entry.value, entry.category);
        }
    }
    Ok(())
}
