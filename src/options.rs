//! Conversion options

/// Immutable configuration snapshot for one conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Capacity of the ingestion queue between decoder callbacks and the
    /// translation worker.
    pub channel_buffer_size: usize,
    /// Emit raw decoded values instead of scale/offset-adjusted ones.
    pub use_raw_value: bool,
    /// Drop fields whose raw value is the protocol invalid sentinel.
    pub print_only_valid_value: bool,
    /// Emit latitude/longitude in degrees instead of semicircles.
    pub print_gps_position_in_degrees: bool,
    /// Indent the final JSON output.
    pub pretty_print: bool,
    /// Leave the `records` array out of the output document.
    pub no_records: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            use_raw_value: false,
            print_only_valid_value: false,
            print_gps_position_in_degrees: false,
            pretty_print: true,
            no_records: false,
        }
    }
}

impl ConvertOptions {
    pub fn builder() -> ConvertOptionsBuilder {
        ConvertOptionsBuilder::default()
    }
}

/// Builder for [`ConvertOptions`]
#[derive(Debug, Default)]
pub struct ConvertOptionsBuilder {
    options: ConvertOptions,
}

impl ConvertOptionsBuilder {
    /// Set the ingestion queue capacity. Zero is ignored and the previous
    /// value kept.
    pub fn channel_buffer_size(mut self, size: usize) -> Self {
        if size > 0 {
            self.options.channel_buffer_size = size;
        }
        self
    }

    pub fn use_raw_value(mut self, raw: bool) -> Self {
        self.options.use_raw_value = raw;
        self
    }

    pub fn print_only_valid_value(mut self, only_valid: bool) -> Self {
        self.options.print_only_valid_value = only_valid;
        self
    }

    pub fn print_gps_position_in_degrees(mut self, degrees: bool) -> Self {
        self.options.print_gps_position_in_degrees = degrees;
        self
    }

    pub fn pretty_print(mut self, pretty: bool) -> Self {
        self.options.pretty_print = pretty;
        self
    }

    pub fn no_records(mut self, no_records: bool) -> Self {
        self.options.no_records = no_records;
        self
    }

    pub fn build(self) -> ConvertOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let options = ConvertOptions::default();
        assert_eq!(options.channel_buffer_size, 1000);
        assert!(!options.use_raw_value);
        assert!(!options.print_only_valid_value);
        assert!(!options.print_gps_position_in_degrees);
        assert!(options.pretty_print);
        assert!(!options.no_records);
    }

    #[test]
    fn test_builder_sets_all_options() {
        let options = ConvertOptions::builder()
            .channel_buffer_size(16)
            .use_raw_value(true)
            .print_only_valid_value(true)
            .print_gps_position_in_degrees(true)
            .pretty_print(false)
            .no_records(true)
            .build();
        assert_eq!(options.channel_buffer_size, 16);
        assert!(options.use_raw_value);
        assert!(options.print_only_valid_value);
        assert!(options.print_gps_position_in_degrees);
        assert!(!options.pretty_print);
        assert!(options.no_records);
    }

    #[test]
    fn test_zero_buffer_size_is_ignored() {
        let options = ConvertOptions::builder().channel_buffer_size(0).build();
        assert_eq!(options.channel_buffer_size, 1000);
    }
}
