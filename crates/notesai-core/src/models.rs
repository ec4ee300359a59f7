//! Core data models for NotesAI.
//!
//! These types are shared across all NotesAI crates and represent the core
//! domain entities: notes and the drafts/patches that create and mutate
//! them, and the identity/session pair owned by the external identity
//! service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Title given to notes saved with a blank title.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

/// Minimum password length accepted by the sign-in/sign-up input layer.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum number of prompt characters carried into a generated note's title.
pub const GENERATED_TITLE_MAX_CHARS: usize = 50;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Color tag of a note.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Default,
    Yellow,
    Blue,
    Green,
    Pink,
    Purple,
    Orange,
}

impl NoteColor {
    /// Every color in display order.
    pub const ALL: [NoteColor; 7] = [
        NoteColor::Default,
        NoteColor::Yellow,
        NoteColor::Blue,
        NoteColor::Green,
        NoteColor::Pink,
        NoteColor::Purple,
        NoteColor::Orange,
    ];

    /// Lowercase name as stored in the database and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteColor::Default => "default",
            NoteColor::Yellow => "yellow",
            NoteColor::Blue => "blue",
            NoteColor::Green => "green",
            NoteColor::Pink => "pink",
            NoteColor::Purple => "purple",
            NoteColor::Orange => "orange",
        }
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NoteColor::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| Error::Validation(format!("Unknown note color: {}", s)))
    }
}

/// A stored note.
///
/// `id`, `created_at` and `updated_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    pub id: Uuid,
    #[serde(rename = "user_id", alias = "owner_id")]
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default)]
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Merge a partial patch into this note in place.
    ///
    /// Only fields present in the patch change. `updated_at` is left alone;
    /// the store owns that timestamp and a later fetch brings it in.
    pub fn apply(&mut self, patch: &NotePatch) {
        if let Some(title) = &patch.title {
            self.title = normalize_title(title);
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(pinned) = patch.is_pinned {
            self.is_pinned = pinned;
        }
    }
}

/// A note as submitted for creation, before the store assigns identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default)]
    pub is_pinned: bool,
}

impl NoteDraft {
    /// Build an unpinned draft from the text as entered.
    pub fn new(title: impl Into<String>, content: impl Into<String>, color: NoteColor) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            color,
            is_pinned: false,
        }
    }

    /// Trim title and content and substitute the default title when blank.
    pub fn normalized(self) -> Self {
        Self {
            title: normalize_title(&self.title),
            content: self.content.trim().to_string(),
            color: self.color,
            is_pinned: self.is_pinned,
        }
    }

    /// Reject drafts with neither a title nor any content.
    ///
    /// Runs on the text as entered, before [`normalized`](Self::normalized)
    /// fills in the default title.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            return Err(Error::validation("Please add some content to your note"));
        }
        Ok(())
    }
}

/// Partial update of a note. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
}

impl NotePatch {
    /// Patch that only flips the pin flag.
    pub fn pinned(is_pinned: bool) -> Self {
        Self {
            is_pinned: Some(is_pinned),
            ..Default::default()
        }
    }

    /// Patch for an edit dialog save: title, content and color together.
    pub fn edit(title: &str, content: &str, color: NoteColor) -> Self {
        Self {
            title: Some(normalize_title(title)),
            content: Some(content.trim().to_string()),
            color: Some(color),
            is_pinned: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.color.is_none()
            && self.is_pinned.is_none()
    }
}

/// Title and body of a note, as handed to the completion service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteExcerpt {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl From<&Note> for NoteExcerpt {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

/// Trim a title, falling back to [`DEFAULT_NOTE_TITLE`] when blank.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_NOTE_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive a note title from the prompt used to generate it.
pub fn title_from_prompt(prompt: &str) -> String {
    let prompt = prompt.trim();
    let mut title: String = prompt.chars().take(GENERATED_TITLE_MAX_CHARS).collect();
    if prompt.chars().count() > GENERATED_TITLE_MAX_CHARS {
        title.push_str("...");
    }
    normalize_title(&title)
}

// =============================================================================
// IDENTITY TYPES
// =============================================================================

/// The signed-in user, as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
}

/// An authenticated session issued by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: Identity,
}

/// Session-change notification broadcast by the identity service.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl AuthEvent {
    /// The identity carried by this event, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                Some(&session.user)
            }
            AuthEvent::SignedOut => None,
        }
    }

    /// Dot-namespaced name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn(_) => "auth.signed_in",
            AuthEvent::TokenRefreshed(_) => "auth.token_refreshed",
            AuthEvent::SignedOut => "auth.signed_out",
        }
    }
}

/// Email/password pair submitted by a sign-in or sign-up form.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Input-layer checks run before the identity service is contacted.
    ///
    /// Everything beyond presence and minimum password length is left to
    /// the identity service.
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(Error::validation("Email is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Trip".to_string(),
            content: "Paris notes".to_string(),
            color: NoteColor::Blue,
            is_pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_color_round_trips_through_str() {
        for color in NoteColor::ALL {
            assert_eq!(color.as_str().parse::<NoteColor>().unwrap(), color);
        }
    }

    #[test]
    fn test_color_parse_is_case_insensitive() {
        assert_eq!("Purple".parse::<NoteColor>().unwrap(), NoteColor::Purple);
    }

    #[test]
    fn test_color_parse_rejects_unknown() {
        let err = "teal".parse::<NoteColor>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_color_serializes_lowercase() {
        let json = serde_json::to_string(&NoteColor::Orange).unwrap();
        assert_eq!(json, "\"orange\"");
    }

    #[test]
    fn test_note_serializes_owner_as_user_id() {
        let note = sample_note();
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["user_id"], note.owner_id.to_string());
        assert!(json.get("owner_id").is_none());
    }

    #[test]
    fn test_draft_blank_title_becomes_untitled() {
        let draft = NoteDraft::new("   ", "body", NoteColor::Default);
        assert!(draft.validate().is_ok());
        assert_eq!(draft.normalized().title, DEFAULT_NOTE_TITLE);
    }

    #[test]
    fn test_draft_trims_fields() {
        let draft = NoteDraft::new("  Groceries ", "\n milk \n", NoteColor::Green).normalized();
        assert_eq!(draft.title, "Groceries");
        assert_eq!(draft.content, "milk");
    }

    #[test]
    fn test_draft_without_title_or_content_is_rejected() {
        let draft = NoteDraft::new("", "  ", NoteColor::Default);
        assert!(draft.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_draft_titled_untitled_is_accepted() {
        let draft = NoteDraft::new("Untitled", "", NoteColor::Default);
        assert!(draft.validate().is_ok());
        assert_eq!(draft.normalized().title, "Untitled");
    }

    #[test]
    fn test_empty_patch_leaves_note_unchanged() {
        let mut note = sample_note();
        let before = note.clone();
        let patch = NotePatch::default();
        assert!(patch.is_empty());
        note.apply(&patch);
        assert_eq!(note, before);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut note = sample_note();
        note.apply(&NotePatch {
            color: Some(NoteColor::Pink),
            ..Default::default()
        });
        assert_eq!(note.color, NoteColor::Pink);
        assert_eq!(note.title, "Trip");
        assert_eq!(note.content, "Paris notes");
    }

    #[test]
    fn test_patch_blank_title_becomes_untitled() {
        let mut note = sample_note();
        note.apply(&NotePatch {
            title: Some(" ".to_string()),
            ..Default::default()
        });
        assert_eq!(note.title, DEFAULT_NOTE_TITLE);
    }

    #[test]
    fn test_pin_toggle_is_symmetric() {
        let mut note = sample_note();
        let original = note.is_pinned;
        note.apply(&NotePatch::pinned(true));
        assert!(note.is_pinned);
        note.apply(&NotePatch::pinned(false));
        assert_eq!(note.is_pinned, original);
    }

    #[test]
    fn test_title_from_short_prompt() {
        assert_eq!(title_from_prompt("Rust lifetimes"), "Rust lifetimes");
    }

    #[test]
    fn test_title_from_long_prompt_is_truncated() {
        let prompt = "a".repeat(60);
        let title = title_from_prompt(&prompt);
        assert_eq!(title, format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn test_excerpt_from_note() {
        let note = sample_note();
        let excerpt = NoteExcerpt::from(&note);
        assert_eq!(excerpt.title, "Trip");
        assert_eq!(excerpt.content, "Paris notes");
    }

    #[test]
    fn test_credentials_require_min_password_length() {
        assert!(Credentials::new("a@b.c", "12345").validate().is_err());
        assert!(Credentials::new("a@b.c", "123456").validate().is_ok());
        assert!(Credentials::new(" ", "123456").validate().is_err());
    }

    #[test]
    fn test_auth_event_identity() {
        let session = Session {
            access_token: "tok".to_string(),
            refresh_token: None,
            expires_at: None,
            user: Identity {
                id: Uuid::nil(),
                email: "a@b.c".to_string(),
            },
        };
        assert_eq!(
            AuthEvent::SignedIn(session).identity().map(|i| i.id),
            Some(Uuid::nil())
        );
        assert!(AuthEvent::SignedOut.identity().is_none());
    }
}
