//! User-facing message texts (Telegram Markdown)

use crate::state_machine::state::{ArtifactInfo, BatchSpec, SingleSpec};
use crate::validate::ValidationError;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Insert thousands separators: 12345 → "12,345".
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn size_mb(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)] // display only
    let mb = bytes as f64 / (1024.0 * 1024.0);
    format!("{mb:.2}")
}

// ============================================================================
// Workflow entry and global commands
// ============================================================================

pub fn welcome_single() -> String {
    format!(
        "🚗 *Vehicle Number Generator Bot*\n\n\
         I'll help you generate vehicle numbers in the format:\n`XX##YY####`\n\n\
         {RULE}\n📋 *Step 1 of 5*\nEnter the *first 2 letters*\n{RULE}\n\n\
         💡 *Example:* `AB`\nUse /cancel to stop anytime"
    )
}

pub fn welcome_batch() -> String {
    format!(
        "📦 *Batch Number Generator*\n\n\
         Generate numbers for *multiple series* at once!\n\n\
         {RULE}\n📋 *Step 1 of 5*\nEnter the *first 2 letters*\n{RULE}\n\n\
         💡 *Example:* `AB`\nUse /cancel to stop anytime"
    )
}

pub fn welcome_convert() -> String {
    format!(
        "📄 *TXT to CSV Converter*\n\n\
         Convert your .txt files to CSV format!\n\n\
         {RULE}\n📤 *How to use:*\n\n\
         1. Send me a .txt file\n\
         2. I'll convert it to CSV format\n\
         3. You can rename the file if needed\n\
         4. Output: `Number,Vehicle Number`\n{RULE}\n\n\
         💡 *Supported format:*\n\
         • `VEHICLE_NUMBER - PHONE_NUMBER`\n\
         • Example: `CG13AA0010 - 7389247318`\n\n\
         📤 *Please upload your .txt file now:*\nUse /cancel to stop"
    )
}

pub fn help() -> String {
    format!(
        "📖 *Help - Vehicle Number Generator Bot*\n\n\
         {RULE}\n🚗 *Vehicle Number Generation*\n{RULE}\n\n\
         Format: `[2 Letters][2 Numbers][2 Letters][4 Digits]`\n\n\
         📝 *Example:*\n\
         • First 2 letters: `AB`\n\
         • Second 2 numbers: `12`\n\
         • Series (2 letters): `CD`\n\
         • Start digits: `0001`\n\
         • End digits: `0100`\n\n\
         Result: `AB12CD0001` to `AB12CD0100`\n\n\
         {RULE}\n📄 *TXT to CSV Converter*\n{RULE}\n\n\
         Convert your .txt files to CSV format\n\n\
         🔹 /start - Generate single series\n\
         🔹 /batch - Generate multiple series at once\n\
         🔹 /txt2csv - Convert TXT file to CSV\n\
         🔹 /help - Show this help message\n\
         🔹 /cancel - Cancel current operation"
    )
}

pub fn cancelled() -> String {
    "❌ *Operation Cancelled*\n\n\
     All progress has been cleared.\n\n\
     Use /start, /batch, or /txt2csv to begin again."
        .to_string()
}

pub fn generation_cancelled() -> String {
    "❌ *Generation Cancelled*\n\nUse /start or /batch to begin again.".to_string()
}

pub fn generic_error() -> String {
    "❌ An error occurred. Please try again or use /cancel to restart.".to_string()
}

// ============================================================================
// Step prompts
// ============================================================================

pub fn invalid_input(reason: &ValidationError) -> String {
    format!("❌ *Invalid Input!*\n\n{reason}:")
}

pub fn single_code_prompt(prefix: &str) -> String {
    format!(
        "✅ *Step 1 Complete!*\nFirst letters: `{prefix}`\n\n\
         {RULE}\n📋 *Step 2 of 5*\nEnter the *second 2 numbers*\n{RULE}\n\n\
         💡 *Example:* `12`"
    )
}

pub fn single_series_prompt(prefix: &str, code: &str) -> String {
    format!(
        "✅ *Step 2 Complete!*\nSecond numbers: `{code}`\n\n\
         📝 Current format: `{prefix}{code}XX####`\n\n\
         {RULE}\n📋 *Step 3 of 5*\nEnter the *series (2 letters)*\n{RULE}\n\n\
         💡 *Example:* `CD`"
    )
}

pub fn single_start_prompt(prefix: &str, code: &str, series: &str) -> String {
    format!(
        "✅ *Step 3 Complete!*\nSeries letters: `{series}`\n\n\
         📝 Current format: `{prefix}{code}{series}####`\n\n\
         {RULE}\n📋 *Step 4 of 5*\nEnter the *starting 4 digits*\n{RULE}\n\n\
         💡 *Example:* `0001`"
    )
}

pub fn single_end_prompt(prefix: &str, code: &str, series: &str, start: &str) -> String {
    format!(
        "✅ *Step 4 Complete!*\nStart digits: `{start}`\n\n\
         📝 Current format: `{prefix}{code}{series}{start}` to `{prefix}{code}{series}XXXX`\n\n\
         {RULE}\n📋 *Step 5 of 5*\nEnter the *ending 4 digits*\n{RULE}\n\n\
         💡 *Example:* `1000`\n⚠️ Must be ≥ start digits"
    )
}

pub fn batch_code_prompt(prefix: &str) -> String {
    format!(
        "✅ Step 1 Complete! First letters: `{prefix}`\n\n\
         📋 Step 2 of 5\nEnter the *second 2 numbers*\n💡 Example: `12`"
    )
}

pub fn batch_series_prompt(code: &str) -> String {
    format!(
        "✅ Step 2 Complete! Second numbers: `{code}`\n\n\
         📋 Step 3 of 5\nEnter *multiple series* (2 letters each)\n\
         💡 Format: `CD,EF,GH` or `CD EF GH`"
    )
}

pub fn batch_start_prompt(series: &[String]) -> String {
    format!(
        "✅ Step 3 Complete! Series: `{}`\nTotal: *{}*\n\n\
         📋 Step 4 of 5\nEnter the *starting 4 digits*\n💡 Example: `0001`",
        series.join(", "),
        series.len()
    )
}

pub fn batch_end_prompt(start: &str) -> String {
    format!(
        "✅ Step 4 Complete! Start digits: `{start}`\n\n\
         📋 Step 5 of 5\nEnter the *ending 4 digits*\n\
         💡 Example: `1000`\n⚠️ Must be ≥ start digits"
    )
}

pub fn range_invalid(start: &str, end: &str) -> String {
    format!(
        "❌ *Invalid Range!*\n\n\
         Start digits (`{start}`) must be ≤ End digits (`{end}`)\n\n\
         Please enter a valid ending 4 digits:"
    )
}

// ============================================================================
// Confirmation
// ============================================================================

pub fn confirm_single(spec: &SingleSpec) -> String {
    format!(
        "✅ *All Information Collected!*\n\n\
         {RULE}\n📋 *Summary:*\n\n\
         🔹 Format: `{stem}####`\n\
         🔹 Range: `{start}` to `{end}`\n\
         🔹 Total numbers: *{count}*\n\n\
         📝 Example: `{stem}{start}`\n\
         📝 Example: `{stem}{end}`\n\n\
         {RULE}\n\nReady to generate? Click the button below!",
        stem = spec.stem(),
        start = spec.start,
        end = spec.end,
        count = group_thousands(spec.count()),
    )
}

pub fn confirm_batch(spec: &BatchSpec) -> String {
    format!(
        "✅ *All Information Collected!*\n\n\
         {RULE}\n📋 *Batch Summary:*\n\n\
         🔹 Format: `{stem}[SERIES]####`\n\
         🔹 Series: `{series}`\n\
         🔹 Series count: *{series_count}*\n\
         🔹 Range: `{start}` to `{end}`\n\
         🔹 Numbers per series: *{per_series}*\n\
         🔹 Total numbers: *{total}*\n\n\
         Ready to generate? Click the button below!",
        stem = spec.stem(),
        series = spec.series.join(", "),
        series_count = spec.series.len(),
        start = spec.start,
        end = spec.end,
        per_series = group_thousands(spec.count_per_series()),
        total = group_thousands(spec.count()),
    )
}

// ============================================================================
// Processing notices
// ============================================================================

pub fn generating() -> String {
    "⏳ *Generating vehicle numbers...*\n\nPlease wait...".to_string()
}

pub fn generating_batch(series_count: usize) -> String {
    format!("⏳ *Generating batch...*\n\nProcessing {series_count} series...")
}

pub fn downloading() -> String {
    "⏳ *Downloading file...*".to_string()
}

pub fn converting() -> String {
    "⏳ *Converting to CSV...*".to_string()
}

pub fn sending_default() -> String {
    "📤 *Sending file with default name...*".to_string()
}

// ============================================================================
// Delivery captions and terminal messages
// ============================================================================

pub fn single_caption(spec: &SingleSpec, records: u64, bytes: u64) -> String {
    format!(
        "✅ *Successfully Generated!*\n\n\
         📊 *Statistics:*\n\
         • Total numbers: *{count}*\n\
         • Format: `{stem}####`\n\
         • Range: `{start}` to `{end}`\n\
         • File size: *{mb} MB*\n\n\
         📁 File ready for download!",
        count = group_thousands(records),
        stem = spec.stem(),
        start = spec.start,
        end = spec.end,
        mb = size_mb(bytes),
    )
}

pub fn batch_caption(spec: &BatchSpec, records: u64, bytes: u64) -> String {
    format!(
        "✅ *Batch Generation Complete!*\n\n\
         📊 *Statistics:*\n\
         • Total numbers: *{count}*\n\
         • Series: `{series}`\n\
         • Series count: *{series_count}*\n\
         • File size: *{mb} MB*\n\n\
         📁 File ready for download!",
        count = group_thousands(records),
        series = spec.series.join(", "),
        series_count = spec.series.len(),
        mb = size_mb(bytes),
    )
}

pub fn convert_caption(info: &ArtifactInfo, file_name: &str) -> String {
    format!(
        "✅ *Conversion Complete!*\n\n\
         📊 *Statistics:*\n\
         • Records: *{records}*\n\
         • Format: `Number,Vehicle Number`\n\
         • File size: *{mb} MB*\n\
         • Filename: `{file_name}`\n\n\
         📁 File ready for download!",
        records = group_thousands(info.records),
        mb = size_mb(info.bytes),
    )
}

pub fn single_done(records: u64) -> String {
    format!(
        "🎉 *Generation Complete!*\n\n\
         ✅ {} vehicle numbers generated!\n\nUse /start to generate more",
        group_thousands(records)
    )
}

pub fn batch_done(records: u64, series_count: usize) -> String {
    format!(
        "🎉 *Batch Complete!*\n\n\
         ✅ {} numbers across {series_count} series!\n\nUse /batch to generate more",
        group_thousands(records)
    )
}

pub fn convert_done(records: u64, file_name: &str) -> String {
    format!(
        "🎉 *Conversion Successful!*\n\n\
         ✅ Converted {} records to CSV\n\
         📋 Format: `Number,Vehicle Number`\n\
         📁 Filename: `{file_name}`\n\nUse /txt2csv to convert another file",
        group_thousands(records)
    )
}

pub fn generation_send_failed(records: u64) -> String {
    format!(
        "⚠️ *File too large to send*\n\n\
         Total numbers: *{}*\n\nPlease reduce the range.",
        group_thousands(records)
    )
}

pub fn convert_send_failed(bytes: u64) -> String {
    format!(
        "⚠️ *File too large*\n\nSize: *{} MB*\n\nPlease use a smaller file.",
        size_mb(bytes)
    )
}

pub fn generation_failed(reason: &str, restart_command: &str) -> String {
    format!("❌ *Error:*\n\n`{reason}`\n\nUse {restart_command} to try again.")
}

pub fn conversion_failed(reason: &str) -> String {
    format!("❌ *Conversion failed!*\n\nError: `{reason}`")
}

// ============================================================================
// Conversion flow
// ============================================================================

pub fn not_a_txt_file() -> String {
    "❌ *Invalid file type!*\n\nPlease send a .txt file.".to_string()
}

pub fn file_too_large() -> String {
    "❌ *File too large!*\n\nMaximum: 50 MB".to_string()
}

pub fn ask_rename(info: &ArtifactInfo) -> String {
    format!(
        "✅ *Conversion Complete!*\n\n\
         📊 *Statistics:*\n\
         • Records: *{records}*\n\
         • Format: `Number,Vehicle Number`\n\
         • File size: *{mb} MB*\n\n\
         📁 Default filename: `{name}`\n\n\
         {RULE}\n\nWould you like to rename the file?",
        records = group_thousands(info.records),
        mb = size_mb(info.bytes),
        name = info.file_name,
    )
}

pub fn rename_prompt() -> String {
    "✏️ *Rename File*\n\n\
     Please enter the new filename (without extension):\n\n\
     💡 *Example:* `my_vehicle_data`\n\
     Will become: `my_vehicle_data.csv`\n\n\
     Use /cancel to cancel"
        .to_string()
}

pub fn invalid_file_name() -> String {
    "❌ *Invalid filename!*\n\nPlease enter a valid filename:".to_string()
}

pub fn convert_cancelled() -> String {
    "❌ *Cancelled*\n\nUse /txt2csv to convert another file".to_string()
}

pub fn artifact_missing() -> String {
    "❌ Error: File not found. Please start over with /txt2csv".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn formats_sizes_in_mb() {
        assert_eq!(size_mb(1024 * 1024), "1.00");
        assert_eq!(size_mb(1536 * 1024), "1.50");
    }
}
