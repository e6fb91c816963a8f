use crate::config::UploadOptions;
use crate::models::upload::UploadFile;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable byte count: repeated division by 1024, at most two
/// decimals, trailing zeros dropped (`5242880` -> `"5 MB"`).
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Lowercased text after the last `.`, with the dot re-attached.
pub fn file_extension(file_name: &str) -> String {
    let tail = file_name.rsplit('.').next().unwrap_or(file_name);
    format!(".{}", tail.to_lowercase())
}

/// Every rule the file breaks; empty when it is acceptable.
pub fn validate_file(file: &UploadFile, options: &UploadOptions) -> Vec<String> {
    let mut errors = Vec::new();

    if file.size() > options.max_size {
        errors.push(format!(
            "File size must be less than {}",
            format_file_size(options.max_size)
        ));
    }

    let extension = file.extension();
    if !options.allowed_types.iter().any(|t| *t == extension) {
        errors.push(format!(
            "File type not allowed. Allowed types: {}",
            options.allowed_types.join(", ")
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_back(formatted: &str) -> f64 {
        let (number, unit) = formatted.split_once(' ').unwrap();
        let power = SIZE_UNITS.iter().position(|u| *u == unit).unwrap() as i32;
        number.parse::<f64>().unwrap() * 1024f64.powi(power)
    }

    #[test]
    fn formats_known_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5_242_880), "5 MB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
        assert_eq!(format_file_size(5 * 1024u64.pow(4)), "5120 GB");
    }

    #[test]
    fn formatting_round_trips_within_rounding() {
        for bytes in [1u64, 999, 1024, 1500, 123_456, 9_999_999, 5_242_881, 7_777_777_777] {
            let formatted = format_file_size(bytes);
            let unit_size = 1024f64.powi(
                SIZE_UNITS
                    .iter()
                    .position(|u| formatted.ends_with(u))
                    .unwrap() as i32,
            );
            let diff = (parse_back(&formatted) - bytes as f64).abs();
            assert!(diff <= 0.005 * unit_size, "{bytes} -> {formatted}");
        }
    }

    #[test]
    fn extension_is_case_insensitive_and_uses_last_dot() {
        assert_eq!(file_extension("CV.Final.PDF"), ".pdf");
        assert_eq!(file_extension("resume.docx"), ".docx");
        assert_eq!(file_extension("README"), ".readme");
    }

    #[test]
    fn validate_file_reports_every_violation() {
        let options = UploadOptions::default();

        let ok = UploadFile::new("cv.PDF", vec![0u8; 1024]);
        assert!(validate_file(&ok, &options).is_empty());

        let at_limit = UploadFile::new("cv.doc", vec![0u8; options.max_size as usize]);
        assert!(validate_file(&at_limit, &options).is_empty());

        let too_big = UploadFile::new("cv.pdf", vec![0u8; options.max_size as usize + 1]);
        assert_eq!(
            validate_file(&too_big, &options),
            vec!["File size must be less than 5 MB".to_string()]
        );

        let both = UploadFile::new("cv.exe", vec![0u8; options.max_size as usize + 1]);
        let errors = validate_file(&both, &options);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[1],
            "File type not allowed. Allowed types: .pdf, .doc, .docx"
        );
    }
}
