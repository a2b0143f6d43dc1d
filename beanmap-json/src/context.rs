//! Per-call configuration passed to every codec
use std::string::String;
use std::vec::Vec;

use serde::{Deserialize, Serialize};

/// Configuration of a single read or write call.
///
/// A `Context` is plain data: clone it, tweak it, hand it to one call. It is
/// never shared with concurrent calls by the crate itself.
///
/// It can be loaded from any serde format:
///
/// ```
/// use beanmap_json::Context;
///
/// let ctx: Context = serde_json::from_str(r#"{"lenient": true, "dateFormat": "%d.%m.%Y"}"#).unwrap();
/// assert!(ctx.lenient);
/// assert_eq!(ctx.date_format.as_deref(), Some("%d.%m.%Y"));
/// assert!(ctx.accept_single_value_as_array);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Context {
    /// Accept and produce the relaxed JSON grammar
    pub lenient: bool,
    /// A `chrono` strftime pattern for date and time codecs
    pub date_format: Option<String>,
    /// Skip `null` object members when writing
    pub omit_nulls: bool,
    /// Write these bean properties first, in this order
    pub property_order: Option<Vec<String>>,
    /// Pretty-print with this many spaces per level
    pub indent: Option<usize>,
    /// Fail on object members a bean does not know about
    pub fail_on_unknown_properties: bool,
    /// Decode a single value where an array is expected as a one-element array
    pub accept_single_value_as_array: bool,
    /// Write dates as epoch milliseconds when no date format is set
    pub write_dates_as_timestamps: bool,
    /// Wrap the top-level bean in an object keyed by its type name
    pub wrap_root_value: bool,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            lenient: false,
            date_format: None,
            omit_nulls: false,
            property_order: None,
            indent: None,
            fail_on_unknown_properties: false,
            accept_single_value_as_array: true,
            write_dates_as_timestamps: true,
            wrap_root_value: false,
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn date_format<S: Into<String>>(mut self, pattern: S) -> Self {
        self.date_format = Some(pattern.into());
        self
    }

    pub fn omit_nulls(mut self, omit_nulls: bool) -> Self {
        self.omit_nulls = omit_nulls;
        self
    }

    pub fn property_order<I, S>(mut self, names: I) -> Self
        where I: IntoIterator<Item=S>, S: Into<String>
    {
        self.property_order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn fail_on_unknown_properties(mut self, fail: bool) -> Self {
        self.fail_on_unknown_properties = fail;
        self
    }

    pub fn accept_single_value_as_array(mut self, accept: bool) -> Self {
        self.accept_single_value_as_array = accept;
        self
    }

    pub fn write_dates_as_timestamps(mut self, timestamps: bool) -> Self {
        self.write_dates_as_timestamps = timestamps;
        self
    }

    pub fn wrap_root_value(mut self, wrap: bool) -> Self {
        self.wrap_root_value = wrap;
        self
    }
}
