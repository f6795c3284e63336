//! Domain constants for aerodrome records
//!
//! Sentinel values written into records when a field cannot be read, and the
//! fixed limits the extraction rules rely on.

/// Sentinel strings used in place of missing values
pub mod sentinel {
    /// Field has no published value or could not be located
    pub const NIL: &str = "NIL";

    /// Traffic types and fire category when the page is silent
    pub const NOT_SPECIFIED: &str = "Not specified";

    /// Service available only on prior request
    pub const ON_REQUEST: &str = "On request";

    /// Canonical round-the-clock value for hours fields
    pub const H24: &str = "H24";
}

/// Airport code shape
pub mod code {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 4;
}

/// Extraction limits
pub mod limits {
    /// Remarks longer than this are cut
    pub const MAX_REMARKS_CHARS: usize = 200;

    /// Remarks at or below this length count as empty
    pub const MIN_REMARKS_CHARS: usize = 5;

    /// At most this many contacts are reported
    pub const MAX_CONTACTS: usize = 3;

    /// Minimum digits for a token to be treated as a telephone number
    pub const MIN_PHONE_DIGITS: usize = 6;

    pub const MAX_PHONE_DIGITS: usize = 15;
}

/// Contact placeholder fields
pub mod contact {
    pub const OPERATOR_TYPE: &str = "AD Operator Contact";
    pub const UNAVAILABLE_NOTES: &str = "Contact information not available";
    pub const SOURCE_NOTES: &str = "From AD 2.2 operator block";
}
