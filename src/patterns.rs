use crate::errors::{Error, Result};
use crate::substitution::{Ruleset, Transform};
use clap::ValueEnum;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static SINGLE_DIGIT_TRACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Track (\d)\.flac").expect("valid track regex"));

static NUMBERED_TRACK_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Track \d+ -").expect("valid prefix regex"));

/// Built-in named transforms for bespoke naming conventions.
///
/// Presets are the fixed library of one-off renames (music collections, mostly)
/// that don't fit a single `old`/`new` pair. Each one is a pure function of the
/// name and can be selected on the command line by its kebab-case name.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Drop " Volume" and " Suite" from names.
    StripVolumeSuite,
    /// Drop " Volume" from names.
    StripVolume,
    /// Turn "Volume " into "iMusic ".
    VolumeToImusic,
    /// Turn "5" into "iMusic 5".
    PrefixImusic,
    /// Zero-pad single digit track numbers: "Track 3.flac" -> "Track 03.flac".
    ZeroPadTrack,
    /// Turn a literal "\." into ".".
    UnescapeDot,
    /// Strip the number from "Track <n> -" prefixes.
    StripTrackNumber,
}

impl Preset {
    /// Every registered preset, in listing order.
    pub fn all() -> &'static [Preset] {
        Self::value_variants()
    }

    /// Looks a preset up by its kebab-case name.
    pub fn from_name(name: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(name, true)
            .map_err(|_| Error::UnknownPreset(name.to_string()))
    }

    /// The kebab-case name clap accepts for this preset.
    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_default()
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::StripVolumeSuite => "remove \" Volume\" and \" Suite\"",
            Preset::StripVolume => "remove \" Volume\"",
            Preset::VolumeToImusic => "replace \"Volume \" with \"iMusic \"",
            Preset::PrefixImusic => "replace \"5\" with \"iMusic 5\"",
            Preset::ZeroPadTrack => "\"Track 3.flac\" becomes \"Track 03.flac\"",
            Preset::UnescapeDot => "replace a literal \"\\.\" with \".\"",
            Preset::StripTrackNumber => "\"Track 7 - Intro\" becomes \"Track Intro\"",
        }
    }

    /// The literal rules behind a preset, if it is a plain substitution.
    fn ruleset(&self) -> Option<Ruleset> {
        let pairs: &[(&str, &str)] = match self {
            Preset::StripVolumeSuite => &[(" Volume", ""), (" Suite", "")],
            Preset::StripVolume => &[(" Volume", "")],
            Preset::VolumeToImusic => &[("Volume ", "iMusic ")],
            Preset::PrefixImusic => &[("5", "iMusic 5")],
            Preset::UnescapeDot => &[("\\.", ".")],
            Preset::ZeroPadTrack | Preset::StripTrackNumber => return None,
        };
        Some(Ruleset::from_pairs(pairs.iter().copied()))
    }
}

impl Transform for Preset {
    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self {
            Preset::ZeroPadTrack => zero_pad_track(input),
            Preset::StripTrackNumber => NUMBERED_TRACK_PREFIX.replace_all(input, "Track"),
            _ => match self.ruleset() {
                Some(rules) => rules.apply(input),
                None => Cow::Borrowed(input),
            },
        }
    }
}

/// Pads the first single digit track number found with a leading zero.
fn zero_pad_track(name: &str) -> Cow<'_, str> {
    let Some(caps) = SINGLE_DIGIT_TRACK.captures(name) else {
        return Cow::Borrowed(name);
    };
    let padded = format!("Track 0{}.flac", &caps[1]);
    SINGLE_DIGIT_TRACK.replace_all(name, padded.as_str())
}
