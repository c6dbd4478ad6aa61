//! # Artify
//!
//! Turn a photo into an art-style rendition. A photo comes from an upload or
//! a camera capture, a style is picked from a built-in catalogue, and a
//! remote image-generation service returns a quick low-resolution preview
//! followed, on request, by a full-resolution result. Results can be
//! downloaded or kept in a small "collage" of recent work.
//!
//! # Data Flow
//!
//! ```text
//!  upload ──┐
//!           ├─▶ PhotoArtifact ──▶ preview / final transform ──▶ download
//!  camera ──┘      (data URI)          (remote service)        └▶ collage
//! ```
//!
//! Every image travels as a self-describing inline string
//! (`data:image/jpeg;base64,...`), so the service and the collage file never
//! need a side channel for the media type.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`codec`] | Inline image representation, upload type and size validation |
//! | [`artifact`] | The photo value passed between stages, plus download naming |
//! | [`imaging`] | Frame math and pixel work for captures: fit, mirror, JPEG encode |
//! | [`capture`] | Camera session state machine over a pluggable device backend |
//! | [`acquisition`] | Upload-or-camera selector holding the current photo |
//! | [`presets`] | Built-in art style catalogue, grouped and ordered by popularity |
//! | [`transform`] | Preview/final requests against the transform service, latest-wins previews |
//! | [`collage`] | JSON-file store of the 50 most recent saved results |
//! | [`studio`] | Ties the above together and turns outcomes into notices |
//! | [`notice`] | User-facing titled messages for failures and successes |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Hard Upload Cap, No Recompression
//!
//! Uploads over 4 MiB are rejected rather than resized. Service payloads stay
//! bounded and the user always knows exactly which pixels were sent.
//!
//! ## Latest Preview Wins
//!
//! Style picks can outrun the service. Each preview request carries a
//! sequence number and only the newest one may update the display; older
//! replies are dropped on arrival. Requests are not cancelled on the wire.
//!
//! ## One Stream, Always Released
//!
//! A capture session holds at most one camera stream, owned by a guard that
//! releases it on drop. Stop, capture, failure and teardown all end in the
//! same place, so a stream cannot outlive its session.
//!
//! ## Failures Become Notices
//!
//! Nothing in the studio is fatal. Every error is returned and also turned
//! into a titled [`notice::Notice`]; the previous state stays intact.

pub mod acquisition;
pub mod artifact;
pub mod capture;
pub mod codec;
pub mod collage;
pub mod config;
pub mod imaging;
pub mod notice;
pub mod output;
pub mod presets;
pub mod studio;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_helpers;
