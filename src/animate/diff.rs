use crate::foundation::core::Rgb8;
use crate::foundation::math::{clamp_unit, lerp};
use crate::layout::engine::{Layout, PositionedToken};
use std::collections::HashMap;

/// A token as painted on one frame of a transition.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedToken {
    /// Text content.
    pub text: String,
    /// Foreground colour.
    pub color: Rgb8,
    /// Left edge.
    pub x: f64,
    /// Top of the line box.
    pub y: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl AnimatedToken {
    fn placed(t: &PositionedToken, opacity: f64) -> Self {
        Self {
            text: t.text.clone(),
            color: t.color,
            x: t.x,
            y: t.y,
            opacity,
        }
    }
}

/// Which side(s) of a transition a token belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenFate {
    /// Present in both layouts under the same identity.
    Matched {
        /// Index in the source tokens.
        from: usize,
        /// Index in the destination tokens.
        to: usize,
    },
    /// Only in the source layout.
    Removed {
        /// Index in the source tokens.
        from: usize,
    },
    /// Only in the destination layout.
    Added {
        /// Index in the destination tokens.
        to: usize,
    },
}

/// Pair tokens of `from` and `to` by `(text, occurrence index)`.
///
/// The occurrence index is the 0-based rank of a text among equal texts in its own layout, so the
/// second `"x"` of one step only ever pairs with the second `"x"` of the other. Entries come in
/// `from` order (matched and removed), followed by added tokens in `to` order.
pub fn match_tokens(from: &[PositionedToken], to: &[PositionedToken]) -> Vec<TokenFate> {
    let mut to_index: HashMap<(&str, usize), usize> = HashMap::with_capacity(to.len());
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, t) in to.iter().enumerate() {
        let occ = seen.entry(t.text.as_str()).or_insert(0);
        to_index.insert((t.text.as_str(), *occ), i);
        *occ += 1;
    }

    let mut claimed = vec![false; to.len()];
    let mut fates = Vec::with_capacity(from.len().max(to.len()));
    seen.clear();
    for (i, t) in from.iter().enumerate() {
        let occ = seen.entry(t.text.as_str()).or_insert(0);
        match to_index.get(&(t.text.as_str(), *occ)) {
            Some(&j) => {
                claimed[j] = true;
                fates.push(TokenFate::Matched { from: i, to: j });
            }
            None => fates.push(TokenFate::Removed { from: i }),
        }
        *occ += 1;
    }
    fates.extend(
        claimed
            .iter()
            .enumerate()
            .filter(|(_, c)| !**c)
            .map(|(j, _)| TokenFate::Added { to: j }),
    );
    fates
}

/// Interpolated tokens between `from` and `to` at `progress`.
///
/// Matched tokens glide from their source to their destination position and take the destination
/// colour as soon as `progress > 0`. Removed tokens fade out in place, added tokens fade in in
/// place. `progress` is clamped into `[0, 1]`.
pub fn animate(from: &Layout, to: &Layout, progress: f64) -> Vec<AnimatedToken> {
    animate_tokens(&from.tokens, &to.tokens, progress)
}

/// [`animate`] over raw token slices.
pub fn animate_tokens(
    from: &[PositionedToken],
    to: &[PositionedToken],
    progress: f64,
) -> Vec<AnimatedToken> {
    let p = clamp_unit(progress);
    match_tokens(from, to)
        .into_iter()
        .map(|fate| match fate {
            TokenFate::Matched { from: i, to: j } => {
                let (a, b) = (&from[i], &to[j]);
                AnimatedToken {
                    text: a.text.clone(),
                    color: if p > 0.0 { b.color } else { a.color },
                    x: lerp(a.x, b.x, p),
                    y: lerp(a.y, b.y, p),
                    opacity: 1.0,
                }
            }
            TokenFate::Removed { from: i } => AnimatedToken::placed(&from[i], 1.0 - p),
            TokenFate::Added { to: j } => AnimatedToken::placed(&to[j], p),
        })
        .collect()
}

/// Static tokens of a held step at full opacity.
pub fn still(layout: &Layout) -> Vec<AnimatedToken> {
    layout
        .tokens
        .iter()
        .map(|t| AnimatedToken::placed(t, 1.0))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/animate/diff.rs"]
mod tests;
