//! Decode and encode settings.

use argo_util::DEFAULT_BUCKETS;

/// Default limit on nested arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Settings for one decode call.
///
/// The defaults accept standard JSON only.
///
/// ```
/// use argo::DecodeOptions;
///
/// let lenient = DecodeOptions::new().allow_trailing_commas(true);
/// let v: Vec<i32> = argo::decode_with(b"[1, 2,]", Default::default(), &lenient).unwrap();
/// assert_eq!(v, [1, 2]);
/// assert!(argo::decode_str::<Vec<i32>>("[1, 2,]").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Accept a `,` directly before `]` or `}`.
    pub allow_trailing_commas: bool,
    /// Skip a byte order mark at the start of the buffer.
    pub skip_bom: bool,
    /// Initial bucket count of the per-call string tables.
    pub string_table_buckets: usize,
    /// Deepest container nesting accepted.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            allow_trailing_commas: false,
            skip_bom: true,
            string_table_buckets: DEFAULT_BUCKETS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_trailing_commas(mut self, allow: bool) -> Self {
        self.allow_trailing_commas = allow;
        self
    }

    pub fn skip_bom(mut self, skip: bool) -> Self {
        self.skip_bom = skip;
        self
    }

    pub fn string_table_buckets(mut self, buckets: usize) -> Self {
        self.string_table_buckets = buckets.max(1);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Settings for one encode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Drop the space after `,` and `:`.
    pub compact: bool,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub(crate) fn item_separator(&self) -> &'static str {
        if self.compact {
            ","
        } else {
            ", "
        }
    }

    pub(crate) fn key_separator(&self) -> &'static str {
        if self.compact {
            ":"
        } else {
            ": "
        }
    }
}
