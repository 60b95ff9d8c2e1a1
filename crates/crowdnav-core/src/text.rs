//! Textual serialization of state records.
//!
//! One line per state instance: space-joined decimal tokens in each
//! record's declared field order (see the record docs in
//! [`state`](crate::state)). Tokens use shortest round-trip float
//! formatting, so parsing a token reproduces the original field value
//! exactly.
//!
//! Parsing is the runtime validation fallback of the statically-typed
//! contract: token counts select the field-set variant unambiguously
//! (6/8 for observable, 9/10/11/12 for full, `4 + 2k` for obstacle),
//! and every parsed record passes back through the validating
//! constructors, so malformed logged state cannot re-enter the system.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::state::{FullState, ObservableState, ObstacleState, Vertex};
use crate::traits::FeatureEncode;

fn write_tokens(f: &mut fmt::Formatter<'_>, values: &[f64]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        // Debug formatting of f64 is shortest-round-trip and always
        // carries a decimal point ("1.0", not "1").
        write!(f, "{v:?}")?;
    }
    Ok(())
}

impl fmt::Display for ObservableState {
    /// `px py [theta] vx vy [vr] radius personal_space`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tokens(f, &self.to_feature_vector(vec![]))
    }
}

impl fmt::Display for FullState {
    /// The observable fields, then `gx gy [gr] v_pref`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tokens(f, &self.to_feature_vector(vec![]))
    }
}

impl fmt::Display for ObstacleState {
    /// `px py theta radius x1 y1 x2 y2 …`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tokens(f, &self.to_feature_vector(vec![]))
    }
}

fn parse_tokens(line: &str) -> Result<Vec<f64>, ParseError> {
    line.split_whitespace()
        .enumerate()
        .map(|(index, token)| {
            f64::from_str(token).map_err(|_| ParseError::InvalidFloat {
                index,
                token: token.to_string(),
            })
        })
        .collect()
}

impl FromStr for ObservableState {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, ParseError> {
        let t = parse_tokens(line)?;
        match t.len() {
            6 => Ok(ObservableState::new(t[0], t[1], t[2], t[3], t[4], t[5])?),
            8 => Ok(
                ObservableState::new(t[0], t[1], t[3], t[4], t[6], t[7])?
                    .with_heading(t[2], t[5])?,
            ),
            found => Err(ParseError::WrongTokenCount {
                expected: "6 or 8",
                found,
            }),
        }
    }
}

impl FromStr for FullState {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, ParseError> {
        let t = parse_tokens(line)?;
        // Base field set (6 or 8) crossed with goal tail (3 or 4) yields
        // four distinct totals, so the length selects the variant.
        let (has_heading, has_gr) = match t.len() {
            9 => (false, false),
            10 => (false, true),
            11 => (true, false),
            12 => (true, true),
            found => {
                return Err(ParseError::WrongTokenCount {
                    expected: "9, 10, 11, or 12",
                    found,
                })
            }
        };
        let base = if has_heading { 8 } else { 6 };
        let (vx, vy, radius, ps) = if has_heading {
            (t[3], t[4], t[6], t[7])
        } else {
            (t[2], t[3], t[4], t[5])
        };
        let (gx, gy) = (t[base], t[base + 1]);
        let v_pref = *t.last().unwrap_or(&0.0);

        let mut state = FullState::new(t[0], t[1], vx, vy, radius, ps, gx, gy, v_pref)?;
        if has_heading {
            state = state.with_heading(t[2], t[5])?;
        }
        if has_gr {
            state = state.with_goal_radius(t[base + 2])?;
        }
        Ok(state)
    }
}

impl FromStr for ObstacleState {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, ParseError> {
        let t = parse_tokens(line)?;
        if t.len() < 4 {
            return Err(ParseError::WrongTokenCount {
                expected: "at least 4",
                found: t.len(),
            });
        }
        let tail = &t[4..];
        if tail.len() % 2 != 0 {
            return Err(ParseError::OddVertexTail { found: tail.len() });
        }
        let vertices: Vec<Vertex> = tail.chunks_exact(2).map(|c| [c[0], c[1]]).collect();
        Ok(ObstacleState::new(t[0], t[1], t[2], t[3], vertices)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn observable_display_matches_contract() {
        let s = ObservableState::new(1.0, 2.0, 0.5, -0.5, 0.3, 0.2).unwrap();
        assert_eq!(s.to_string(), "1.0 2.0 0.5 -0.5 0.3 0.2");
    }

    #[test]
    fn token_count_equals_feature_len() {
        let s = ObservableState::new(1.0, 2.0, 0.5, -0.5, 0.3, 0.2)
            .unwrap()
            .with_heading(0.1, 0.0)
            .unwrap();
        assert_eq!(s.to_string().split_whitespace().count(), s.feature_len());
    }

    #[test]
    fn observable_round_trips_both_variants() {
        let a = ObservableState::new(1.5, -2.25, 0.5, -0.5, 0.3, 0.2).unwrap();
        assert_eq!(a.to_string().parse::<ObservableState>().unwrap(), a);

        let b = a.with_heading(0.75, -0.125).unwrap();
        assert_eq!(b.to_string().parse::<ObservableState>().unwrap(), b);
    }

    #[test]
    fn full_round_trips_all_variants() {
        let base =
            FullState::new(0.5, -1.0, 0.25, 0.0, 0.3, 0.2, 4.0, -4.0, 1.25).unwrap();
        let variants = [
            base,
            base.with_goal_radius(0.5).unwrap(),
            base.with_heading(1.5, -0.25).unwrap(),
            base.with_heading(1.5, -0.25)
                .unwrap()
                .with_goal_radius(0.5)
                .unwrap(),
        ];
        for s in variants {
            assert_eq!(s.to_string().parse::<FullState>().unwrap(), s);
        }
    }

    #[test]
    fn obstacle_round_trips_with_vertices() {
        let o = ObstacleState::new(
            1.0,
            -1.0,
            0.5,
            0.75,
            [[0.0, 0.0], [2.0, 0.0], [2.0, 1.0]],
        )
        .unwrap();
        let parsed: ObstacleState = o.to_string().parse().unwrap();
        assert_eq!(parsed, o);
        assert_eq!(parsed.vertices().len(), 3);
    }

    #[test]
    fn wrong_token_count_rejected() {
        let err = "1.0 2.0 3.0".parse::<ObservableState>().unwrap_err();
        assert_eq!(
            err,
            ParseError::WrongTokenCount {
                expected: "6 or 8",
                found: 3
            }
        );
        assert!("1.0 2.0 3.0 4.0 5.0 6.0 7.0".parse::<FullState>().is_err());
    }

    #[test]
    fn bad_float_rejected_with_position() {
        let err = "1.0 2.0 x 0.5 0.3 0.2".parse::<ObservableState>().unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidFloat {
                index: 2,
                token: "x".to_string()
            }
        );
    }

    #[test]
    fn odd_vertex_tail_rejected() {
        let err = "0.0 0.0 0.0 1.0 2.0".parse::<ObstacleState>().unwrap_err();
        assert_eq!(err, ParseError::OddVertexTail { found: 1 });
    }

    #[test]
    fn parse_revalidates_contracts() {
        // Valid syntax, invalid physics: zero radius.
        let err = "1.0 2.0 0.5 -0.5 0.0 0.2".parse::<ObservableState>().unwrap_err();
        assert!(matches!(err, ParseError::Contract(_)));
    }

    proptest! {
        // Lossless token round-trip for representable floats.
        #[test]
        fn tokens_round_trip_exactly(
            px in -1e6f64..1e6,
            py in -1e6f64..1e6,
            vx in -10.0f64..10.0,
            vy in -10.0f64..10.0,
            r in 0.001f64..5.0,
            ps in 0.0f64..5.0,
        ) {
            let s = ObservableState::new(px, py, vx, vy, r, ps).unwrap();
            let parsed: ObservableState = s.to_string().parse().unwrap();
            prop_assert_eq!(parsed, s);
        }
    }
}
