//! Document module - the persisted shape of a todo item

use std::fmt;

/// Store-native key of a document, based on UUIDv7
///
/// The store keeps the key as 16 big-endian bytes. Clients only ever see the
/// 32-character lowercase hex rendering produced by `Display`, and hand it back
/// through [`DocumentId::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u128);

impl DocumentId {
    /// Generate a new UUIDv7-based key
    ///
    /// # Examples
    ///
    /// ```
    /// use todo_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a key from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Parse a wire identifier
    ///
    /// Accepts the 32-character hex form rendered by `Display` as well as the
    /// other standard UUID text forms (hyphenated, braced, urn).
    ///
    /// # Examples
    ///
    /// ```
    /// use todo_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// let parsed = DocumentId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// assert!(DocumentId::parse("nope").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, InvalidDocumentId> {
        uuid::Uuid::try_parse(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| InvalidDocumentId {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Storage encoding of the key
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Decode a key from its storage encoding
    ///
    /// Returns `None` unless exactly 16 bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 16] = bytes.try_into().ok()?;
        Some(Self(u128::from_be_bytes(arr)))
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0).simple())
    }
}

impl std::str::FromStr for DocumentId {
    type Err = InvalidDocumentId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A wire identifier that does not decode into a [`DocumentId`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDocumentId {
    /// The rejected input
    pub input: String,
    /// Why it was rejected
    pub reason: String,
}

impl fmt::Display for InvalidDocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid identifier {:?}: {}", self.input, self.reason)
    }
}

impl std::error::Error for InvalidDocumentId {}

/// A todo item as the store keeps it
///
/// `id` is `None` until the store assigns one on insertion. The state is held
/// by its canonical name (`"IN_PROGRESS"`, ...) so filters compare names
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Store-assigned key
    pub id: Option<DocumentId>,

    /// Short title
    pub title: String,

    /// Free-text description, the target of pattern searches
    pub description: String,

    /// Tags in caller order, duplicates allowed
    pub tags: Vec<String>,

    /// Canonical state name
    pub state: String,

    /// Reminder as Unix seconds, zero when none was given
    pub reminder: i64,
}

/// Partial overwrite applied by `update_one`
///
/// Tags and state are always written. The optional fields are written only
/// when present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentUpdate {
    /// New title, if supplied
    pub title: Option<String>,

    /// New description, if supplied
    pub description: Option<String>,

    /// Replacement tag list
    pub tags: Vec<String>,

    /// Replacement state name
    pub state: String,

    /// New reminder in Unix seconds, if supplied
    pub reminder: Option<i64>,
}

impl DocumentUpdate {
    /// Apply this update to a document in place
    ///
    /// Stores that cannot express the update natively use this so every
    /// backend agrees on field presence.
    pub fn apply_to(&self, document: &mut Document) {
        if let Some(title) = &self.title {
            document.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            document.description.clone_from(description);
        }
        document.tags.clone_from(&self.tags);
        document.state.clone_from(&self.state);
        if let Some(reminder) = self.reminder {
            document.reminder = reminder;
        }
    }
}
