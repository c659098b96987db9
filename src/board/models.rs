//! Domain models for destination boards, fields, and items.
//!
//! Identifiers minted by GitHub are opaque and board-specific, so each kind
//! gets its own newtype. Fields and options are matched across boards by
//! display name only; see [`BoardSchema`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw GraphQL node identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub const fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Node identifier of a Projects V2 board.
    BoardId
);
opaque_id!(
    /// Node identifier of a custom field on one board.
    FieldId
);
opaque_id!(
    /// Node identifier of a single-select option on one board.
    OptionId
);
opaque_id!(
    /// Identifier of a board membership record.
    ///
    /// Needed to set field values on, or remove, a board item.
    ItemId
);
opaque_id!(
    /// Node identifier of the underlying issue or pull request.
    ///
    /// Stable across boards; used to add items and detect duplicates.
    ContentId
);
opaque_id!(
    /// Node identifier of a user or organisation.
    OwnerId
);
opaque_id!(
    /// Node identifier of a repository.
    RepositoryId
);

/// Whether a board owner is a user or an organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind {
    /// A personal account.
    User,
    /// An organisation account.
    Organization,
}

impl OwnerKind {
    /// Returns the GraphQL root field for this owner kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
        }
    }
}

/// Board owner login and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardOwner {
    /// Login name.
    pub login: String,
    /// Account kind the board was found or created under.
    pub kind: OwnerKind,
}

/// Board visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Anyone can see the board.
    Public,
    /// Only collaborators can see the board.
    #[default]
    Private,
}

impl Visibility {
    /// Maps the GraphQL `public` flag.
    #[must_use]
    pub const fn from_public(public: bool) -> Self {
        if public { Self::Public } else { Self::Private }
    }

    /// Returns the GraphQL `public` flag.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// A destination board resolved for the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectBoard {
    /// Opaque board identifier.
    pub id: BoardId,
    /// Per-owner board number.
    pub number: u64,
    /// Human title; unique per owner for matching purposes.
    pub title: String,
    /// Browser URL.
    pub url: String,
    /// Owning account.
    pub owner: BoardOwner,
    /// Current visibility.
    pub visibility: Visibility,
}

/// Data type tag of a custom field.
///
/// Only text and single-select fields are written by the engine; other tags
/// are carried opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldDataType {
    /// Free text.
    Text,
    /// One option out of a fixed set.
    SingleSelect,
    /// Any other GitHub data type, e.g. `NUMBER`, `DATE`, `ITERATION`.
    Other(String),
}

impl FieldDataType {
    /// Returns the GraphQL enum value.
    #[must_use]
    pub fn as_api_str(&self) -> &str {
        match self {
            Self::Text => "TEXT",
            Self::SingleSelect => "SINGLE_SELECT",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for FieldDataType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TEXT" => Self::Text,
            "SINGLE_SELECT" => Self::SingleSelect,
            _ => Self::Other(value),
        }
    }
}

impl From<FieldDataType> for String {
    fn from(value: FieldDataType) -> Self {
        match value {
            FieldDataType::Text => "TEXT".to_owned(),
            FieldDataType::SingleSelect => "SINGLE_SELECT".to_owned(),
            FieldDataType::Other(raw) => raw,
        }
    }
}

/// One option of a single-select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    /// Board-specific option identifier.
    pub id: OptionId,
    /// Display name, matched case-insensitively.
    pub name: String,
}

/// A custom field as it exists on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Board-specific field identifier.
    pub id: FieldId,
    /// Display name, matched case-sensitively.
    pub name: String,
    /// Data type tag.
    pub data_type: FieldDataType,
    /// Ordered options; empty unless single-select.
    pub options: Vec<FieldOption>,
}

impl FieldDefinition {
    /// Finds an option by case-insensitive exact name.
    #[must_use]
    pub fn option_named(&self, name: &str) -> Option<&FieldOption> {
        let wanted = name.to_lowercase();
        self.options
            .iter()
            .find(|option| option.name.to_lowercase() == wanted)
    }

    /// Counts requested option names with no case-insensitive match.
    #[must_use]
    pub fn missing_options(&self, requested: &[String]) -> usize {
        requested
            .iter()
            .filter(|name| self.option_named(name).is_none())
            .count()
    }
}

/// A field the caller wants present on the destination board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldSpec {
    /// Display name.
    pub name: String,
    /// Desired data type.
    pub data_type: FieldDataType,
    /// Full desired option list for single-select fields.
    #[serde(default)]
    pub options: Vec<String>,
}

impl FieldSpec {
    /// Describes a text field.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: FieldDataType::Text,
            options: Vec::new(),
        }
    }

    /// Describes a single-select field with `options`.
    #[must_use]
    pub fn single_select<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            data_type: FieldDataType::SingleSelect,
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}

/// An item as it exists on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardItem {
    /// Membership record identifier.
    pub id: ItemId,
    /// Underlying content, absent when GitHub redacts it.
    pub content_id: Option<ContentId>,
    /// Content title for logging.
    pub title: Option<String>,
}

/// An item the caller wants present on the destination board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CandidateItem {
    /// Issue or pull request node identifier.
    #[serde(default)]
    pub content_id: Option<ContentId>,
    /// Title for logging.
    #[serde(default)]
    pub title: Option<String>,
    /// Field name to desired display value.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl CandidateItem {
    /// Creates a candidate for `content_id` with no field values.
    #[must_use]
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: Some(ContentId::new(content_id)),
            title: None,
            fields: BTreeMap::new(),
        }
    }

    /// Sets the title used in logs.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds a desired field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the content identifier unless it is missing or blank.
    #[must_use]
    pub fn content_id(&self) -> Option<&ContentId> {
        self.content_id
            .as_ref()
            .filter(|content_id| !content_id.as_str().trim().is_empty())
    }

    /// Label for log lines: the title, else the content identifier.
    #[must_use]
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or_else(|| self.content_id().map(ContentId::as_str))
            .unwrap_or("<no content id>")
    }
}

/// A resolved value for one field-value mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Option identifier on the destination field.
    SingleSelect(OptionId),
    /// Text passed through verbatim.
    Text(String),
}

impl FieldValue {
    /// Renders the `ProjectV2FieldValue` input object.
    #[must_use]
    pub fn to_graphql(&self) -> Value {
        match self {
            Self::SingleSelect(option) => json!({ "singleSelectOptionId": option.as_str() }),
            Self::Text(text) => json!({ "text": text }),
        }
    }
}

/// Name-keyed field table of one board, rebuilt each run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSchema {
    fields: BTreeMap<String, FieldDefinition>,
}

impl BoardSchema {
    /// Builds a schema from definitions; later duplicates replace earlier ones.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = FieldDefinition>) -> Self {
        let mut schema = Self::default();
        for definition in definitions {
            schema.insert(definition);
        }
        schema
    }

    /// Adds or replaces a definition under its display name.
    pub fn insert(&mut self, definition: FieldDefinition) {
        self.fields.insert(definition.name.clone(), definition);
    }

    /// Looks up a field by case-sensitive display name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Returns true when a field with `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the board has no named fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{
        BoardSchema, CandidateItem, FieldDataType, FieldDefinition, FieldId, FieldOption,
        FieldSpec, FieldValue, OptionId,
    };

    fn status_field() -> FieldDefinition {
        FieldDefinition {
            id: FieldId::new("F_status"),
            name: "Status".to_owned(),
            data_type: FieldDataType::SingleSelect,
            options: vec![
                FieldOption {
                    id: OptionId::new("O_todo"),
                    name: "Todo".to_owned(),
                },
                FieldOption {
                    id: OptionId::new("O_tracked"),
                    name: "Tracked".to_owned(),
                },
            ],
        }
    }

    #[rstest]
    #[case::exact("Tracked", Some("O_tracked"))]
    #[case::lower("tracked", Some("O_tracked"))]
    #[case::upper("TODO", Some("O_todo"))]
    #[case::prefix("Track", None)]
    fn option_lookup_is_case_insensitive_exact(#[case] name: &str, #[case] expected: Option<&str>) {
        let field = status_field();
        assert_eq!(
            field.option_named(name).map(|option| option.id.as_str()),
            expected
        );
    }

    #[rstest]
    fn counts_missing_options() {
        let field = status_field();
        let requested = vec!["todo".to_owned(), "Done".to_owned(), "Blocked".to_owned()];
        assert_eq!(field.missing_options(&requested), 2);
    }

    #[rstest]
    fn schema_lookup_is_case_sensitive() {
        let schema = BoardSchema::from_definitions([status_field()]);
        assert!(schema.contains("Status"));
        assert!(!schema.contains("status"));
    }

    #[rstest]
    #[case::text("TEXT", FieldDataType::Text)]
    #[case::select("SINGLE_SELECT", FieldDataType::SingleSelect)]
    #[case::other("DATE", FieldDataType::Other("DATE".to_owned()))]
    fn data_type_round_trips_api_strings(#[case] raw: &str, #[case] expected: FieldDataType) {
        let parsed = FieldDataType::from(raw.to_owned());
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_api_str(), raw);
    }

    #[rstest]
    fn field_spec_deserialises_without_options() {
        let spec: FieldSpec = serde_json::from_value(json!({
            "name": "KEP",
            "data_type": "TEXT"
        }))
        .expect("spec should decode");
        assert_eq!(spec, FieldSpec::text("KEP"));
    }

    #[rstest]
    #[case::missing(CandidateItem::default(), None)]
    #[case::blank(CandidateItem::new("  "), None)]
    #[case::present(CandidateItem::new("I_1"), Some("I_1"))]
    fn candidate_content_id_ignores_blank(
        #[case] candidate: CandidateItem,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(candidate.content_id().map(|id| id.as_str()), expected);
    }

    #[rstest]
    fn field_values_render_graphql_input() {
        assert_eq!(
            FieldValue::SingleSelect(OptionId::new("O_1")).to_graphql(),
            json!({ "singleSelectOptionId": "O_1" })
        );
        assert_eq!(
            FieldValue::Text("v1.36".to_owned()).to_graphql(),
            json!({ "text": "v1.36" })
        );
    }
}
