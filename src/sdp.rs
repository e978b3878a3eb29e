//! SDP Rewriter: bandwidth-line enforcement and optional sanitizing
//! round-trip (SPEC_FULL.md §4.1).
//!
//! `medea-jason` hands SDP straight through as an opaque `RTCSessionDescription`
//! and never rewrites it; this module is new surface this crate adds, built
//! in the surrounding codebase's idiom: a small `derive_more`-based error enum, a
//! parse step that never aborts negotiation (a failure degrades to "use the
//! SDP as-is", exactly like `PeerConnection::update_local_stream`'s
//! soft-failure paths in `peer/mod.rs`), and plain `Display`/`FromStr`-style
//! round-tripping rather than a full SDP grammar parser (the orchestrator
//! only ever needs to see `m=`, `c=IN`, and `b=` lines).

use derive_more::{Display, From};

use crate::config::Bandwidth;

/// Errors raised while parsing an SDP message into a [`SessionDescription`].
#[derive(Clone, Debug, Display, From)]
pub enum SdpError {
    /// The SDP contained no media (`m=`) sections at all.
    #[display(fmt = "SDP contains no media sections")]
    NoMediaSections,
}

/// One `m=`-delimited media section of an SDP message, kept as an ordered
/// list of raw lines so re-serialization is lossless for everything this
/// crate doesn't need to understand.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct MediaSection {
    lines: Vec<String>,
}

/// A parsed SDP message: a session-level preamble plus zero or more media
/// sections.
///
/// Round-trips losslessly: [`SessionDescription::to_string`] after
/// [`SessionDescription::parse`] reproduces the input verbatim, unless
/// [`SessionDescription::enforce_bandwidth`] mutated it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionDescription {
    preamble: Vec<String>,
    sections: Vec<MediaSection>,
}

impl SessionDescription {
    /// Parses raw SDP text into a [`SessionDescription`].
    ///
    /// # Errors
    ///
    /// Returns [`SdpError::NoMediaSections`] if the text contains no `m=`
    /// lines. Per SPEC_FULL.md §4.1, a parse failure must never abort
    /// negotiation; callers should fall back to [`Self::passthrough`] and log
    /// the error rather than propagate it into the negotiation path.
    pub fn parse(raw: &str) -> Result<Self, SdpError> {
        let mut preamble = Vec::new();
        let mut sections: Vec<MediaSection> = Vec::new();

        for line in raw.lines() {
            if line.starts_with("m=") {
                sections.push(MediaSection { lines: vec![line.to_string()] });
            } else if let Some(section) = sections.last_mut() {
                section.lines.push(line.to_string());
            } else {
                preamble.push(line.to_string());
            }
        }

        if sections.is_empty() {
            return Err(SdpError::NoMediaSections);
        }

        Ok(Self { preamble, sections })
    }

    /// Wraps `raw` as a passthrough [`SessionDescription`] that reproduces
    /// the original text unchanged, used when [`Self::parse`] fails and the
    /// original SDP must be used as-is.
    #[must_use]
    pub fn passthrough(raw: &str) -> RawOrParsed {
        RawOrParsed::Raw(raw.to_string())
    }

    /// Enforces the given `bandwidth` ceiling on every media section: inserts
    /// or rewrites `b=AS`/`b=TIAS` immediately after each section's `c=IN …`
    /// line, or strips existing `b=AS`/`b=TIAS` lines when `bandwidth` is
    /// [`Bandwidth::Unlimited`].
    pub fn enforce_bandwidth(&mut self, bandwidth: Bandwidth) {
        for section in &mut self.sections {
            section.lines.retain(|l| !is_bandwidth_line(l));

            if let Bandwidth::Kbps(kbps) = bandwidth {
                let c_line_index = section
                    .lines
                    .iter()
                    .position(|l| l.starts_with("c=IN"));
                let insert_at = c_line_index.map_or(1, |i| i + 1);
                section.lines.insert(insert_at, format!("b=TIAS:{}", kbps * 1000));
                section.lines.insert(insert_at, format!("b=AS:{kbps}"));
            }
        }
    }

    /// Drops `a=extmap:` RTP header-extension mappings from every media
    /// section (SPEC_FULL.md §4.1, "SDP transform"). Header-extension URIs
    /// negotiated by one browser vendor are a common source of an answering
    /// browser rejecting the whole offer; renegotiating without them is
    /// strictly a capability reduction the media path tolerates.
    pub fn sanitize(&mut self) {
        for section in &mut self.sections {
            section.lines.retain(|l| !is_extmap_line(l));
        }
    }

    /// Returns the number of `b=AS`/`b=TIAS` lines present across all media
    /// sections, for testing invariant 2 of SPEC_FULL.md §8.
    #[cfg(test)]
    fn bandwidth_line_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.lines.iter())
            .filter(|l| is_bandwidth_line(l))
            .count()
    }

    /// Returns the number of `a=extmap:` lines present across all media
    /// sections, for testing the SDP transform.
    #[cfg(test)]
    fn extmap_line_count(&self) -> usize {
        self.sections.iter().flat_map(|s| s.lines.iter()).filter(|l| is_extmap_line(l)).count()
    }
}

fn is_bandwidth_line(line: &str) -> bool {
    line.starts_with("b=AS:") || line.starts_with("b=TIAS:")
}

fn is_extmap_line(line: &str) -> bool {
    line.starts_with("a=extmap:")
}

impl std::fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.preamble {
            writeln!(f, "{line}")?;
        }
        for section in &self.sections {
            for line in &section.lines {
                writeln!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

/// Either a successfully parsed SDP, or the original raw text kept verbatim
/// because parsing failed.
pub enum RawOrParsed {
    Raw(String),
    Parsed(SessionDescription),
}

impl RawOrParsed {
    /// Renders back to SDP text, either the mutated parse or the untouched
    /// original.
    #[must_use]
    pub fn into_sdp(self) -> String {
        match self {
            Self::Raw(raw) => raw,
            Self::Parsed(parsed) => parsed.to_string(),
        }
    }
}

/// Rewrites `raw` SDP per SPEC_FULL.md §4.1: enforces `bandwidth`, and, when
/// `sanitize` is set, round-trips through the structured parser to drop
/// anything this crate doesn't recognize as a supported line.
///
/// Never fails: a parse error is logged and the original `raw` SDP is
/// returned untouched, matching the "parse failure does not abort
/// negotiation" rule.
#[must_use]
pub fn rewrite(raw: &str, bandwidth: Bandwidth, sanitize: bool) -> String {
    match SessionDescription::parse(raw) {
        Ok(mut parsed) => {
            parsed.enforce_bandwidth(bandwidth);
            if sanitize {
                parsed.sanitize();
            }
            parsed.to_string()
        }
        Err(err) => {
            log::warn!("failed to parse SDP, using as-is: {err}");
            raw.to_string()
        }
    }
}
