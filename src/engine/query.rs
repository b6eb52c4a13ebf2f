//! # Venue query: name + address and the derived search string.
//!
//! [`VenueQuery`] is the configured identity of one venue. The data source
//! is queried with a single string; [`VenueQuery::target`] derives it so
//! the venue name is never duplicated when the address already starts with
//! it (a common pattern in copy-pasted addresses like
//! `"Cafe Luna, 12 Pier Rd"`).

use crate::error::WatchError;

/// Configured name and address of one venue.
///
/// Invariant: at least one of the two fields is non-empty after trimming;
/// [`VenueQuery::new`] rejects the both-empty case with
/// [`WatchError::EmptyVenue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueQuery {
    name: String,
    address: String,
}

impl VenueQuery {
    /// Creates a query from a venue name and address.
    ///
    /// Both values are trimmed; if both end up empty the query is rejected.
    ///
    /// # Example
    /// ```
    /// use popwatch::VenueQuery;
    ///
    /// let q = VenueQuery::new("Cafe Luna", "12 Pier Rd, Harbortown").unwrap();
    /// assert_eq!(q.target(), "Cafe Luna, 12 Pier Rd, Harbortown");
    ///
    /// assert!(VenueQuery::new("  ", "").is_err());
    /// ```
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Result<Self, WatchError> {
        let name = name.into().trim().to_string();
        let address = address.into().trim().to_string();
        if name.is_empty() && address.is_empty() {
            return Err(WatchError::EmptyVenue);
        }
        Ok(Self { name, address })
    }

    /// Returns the configured venue name (possibly empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured address (possibly empty).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the display label: the name when present, the address
    /// otherwise.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.address
        } else {
            &self.name
        }
    }

    /// Derives the query string sent to the data source.
    ///
    /// Rules:
    /// - only one field non-empty → that field;
    /// - the name is already a prefix of the address (case-insensitive,
    ///   ending at a `,`/space boundary or the end) → the address alone;
    /// - otherwise → `"{name}, {address}"`.
    pub fn target(&self) -> String {
        if self.name.is_empty() {
            return self.address.clone();
        }
        if self.address.is_empty() {
            return self.name.clone();
        }
        if address_starts_with_name(&self.address, &self.name) {
            return self.address.clone();
        }
        format!("{}, {}", self.name, self.address)
    }
}

/// Case-insensitive prefix check with a `,`/space boundary after the name.
fn address_starts_with_name(address: &str, name: &str) -> bool {
    let mut addr = address.chars();
    for expected in name.chars() {
        match addr.next() {
            Some(got) if chars_eq_ignore_case(got, expected) => {}
            _ => return false,
        }
    }
    // The prefix must end at a boundary, not inside a longer word.
    match addr.next() {
        None => true,
        Some(c) => c == ',' || c.is_whitespace(),
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
