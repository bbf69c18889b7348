//! Run configuration: how delta is chosen and which executor runs the batches.
//!
//! Layers are applied in order: `Default` → JSON (`from_json`) → environment (`from_env`).
//! Environment keys:
//!  - `SSSP_DELTA`         fixed bucket width (implies `fixed` mode)
//!  - `SSSP_DELTA_MODE`    `avg` | `quantile` | `fixed`
//!  - `SSSP_DELTA_MULT`    multiplier applied to the sampled statistic
//!  - `SSSP_HEAVY_TARGET`  share of edges that should end up heavy in `quantile` mode
//!  - `SSSP_SAMPLE_SIZE`   number of leading weights sampled
//!  - `SSSP_THREADS`       1 = sequential, n > 1 = dedicated pool, unset = rayon global pool

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigIssue, Result};
use crate::graph::{check_delta, Edge};
use crate::relax::Executor;

const DELTA_MIN: f32 = 1e-4;
const DELTA_MAX: f32 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeltaChoice {
    Fixed { delta: f32 },
    /// mean sampled weight * multiplier
    Average { multiplier: f32 },
    /// `(1 - heavy_target)` quantile of sampled weights * multiplier
    Quantile { heavy_target: f32, multiplier: f32 },
}

impl Default for DeltaChoice {
    fn default() -> Self { DeltaChoice::Average { multiplier: 3.0 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsspConfig {
    pub delta: DeltaChoice,
    pub sample_size: usize,
    pub threads: Option<usize>,
}

impl Default for SsspConfig {
    fn default() -> Self {
        Self { delta: DeltaChoice::default(), sample_size: 1000, threads: None }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigIssue::BadEnvValue { key: key.to_string(), value: value.to_string() }.into())
}

impl SsspConfig {
    pub fn with_delta(delta: f32) -> Self {
        Self { delta: DeltaChoice::Fixed { delta }, ..Self::default() }
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overlaid with `SSSP_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|k| std::env::var(k).ok())
    }

    /// Apply the `SSSP_*` keys found by `lookup` on top of `self`.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mult = lookup("SSSP_DELTA_MULT").map(|v| parse::<f32>("SSSP_DELTA_MULT", &v)).transpose()?;
        let heavy = lookup("SSSP_HEAVY_TARGET").map(|v| parse::<f32>("SSSP_HEAVY_TARGET", &v)).transpose()?;
        if let Some(mode) = lookup("SSSP_DELTA_MODE") {
            self.delta = match mode.trim().to_ascii_lowercase().as_str() {
                "avg" | "average" => DeltaChoice::Average { multiplier: mult.unwrap_or(3.0) },
                "quantile" => DeltaChoice::Quantile { heavy_target: heavy.unwrap_or(0.15), multiplier: mult.unwrap_or(1.0) },
                "fixed" => match lookup("SSSP_DELTA") {
                    Some(d) => DeltaChoice::Fixed { delta: parse("SSSP_DELTA", &d)? },
                    None => return Err(ConfigIssue::BadEnvValue { key: "SSSP_DELTA".into(), value: String::new() }.into()),
                },
                _ => return Err(ConfigIssue::BadEnvValue { key: "SSSP_DELTA_MODE".into(), value: mode }.into()),
            };
        } else {
            match &mut self.delta {
                DeltaChoice::Average { multiplier } => { if let Some(m) = mult { *multiplier = m; } }
                DeltaChoice::Quantile { heavy_target, multiplier } => {
                    if let Some(m) = mult { *multiplier = m; }
                    if let Some(h) = heavy { *heavy_target = h; }
                }
                DeltaChoice::Fixed { .. } => {}
            }
        }
        if let Some(d) = lookup("SSSP_DELTA") {
            self.delta = DeltaChoice::Fixed { delta: parse("SSSP_DELTA", &d)? };
        }
        if let Some(v) = lookup("SSSP_SAMPLE_SIZE") {
            self.sample_size = parse("SSSP_SAMPLE_SIZE", &v)?;
        }
        if let Some(v) = lookup("SSSP_THREADS") {
            self.threads = Some(parse("SSSP_THREADS", &v)?);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        match self.delta {
            DeltaChoice::Fixed { delta } => check_delta(delta)?,
            DeltaChoice::Average { multiplier } | DeltaChoice::Quantile { multiplier, .. } => {
                if !(multiplier.is_finite() && multiplier > 0.0) {
                    return Err(ConfigIssue::NonPositiveMultiplier { multiplier }.into());
                }
            }
        }
        if let DeltaChoice::Quantile { heavy_target, .. } = self.delta {
            if !heavy_target.is_finite() {
                return Err(ConfigIssue::BadEnvValue { key: "heavy_target".into(), value: heavy_target.to_string() }.into());
            }
        }
        if self.threads == Some(0) {
            return Err(ConfigIssue::ThreadPool("threads must be at least 1".into()).into());
        }
        Ok(())
    }

    /// Bucket width for a graph with these edges. Derived widths are clamped to
    /// `[1e-4, 1e6]`; a fixed width is used as given.
    pub fn resolve_delta(&self, edges: &[Edge]) -> Result<f32> {
        self.validate()?;
        let take = self.sample_size.min(edges.len());
        let sample = edges[..take].iter().map(|e| e.weight);
        let delta = match self.delta {
            DeltaChoice::Fixed { delta } => return Ok(delta),
            DeltaChoice::Average { multiplier } => {
                let mut avg = 1.0f32;
                if take > 0 {
                    avg = sample.sum::<f32>() / take as f32;
                    if avg <= 0.0 { avg = 1.0; }
                }
                avg * multiplier
            }
            DeltaChoice::Quantile { heavy_target, multiplier } => {
                let mut samp: Vec<f32> = sample.collect();
                if samp.is_empty() {
                    multiplier
                } else {
                    samp.sort_by(f32::total_cmp);
                    let heavy_target = heavy_target.clamp(0.01, 0.9);
                    let q = ((samp.len() - 1) as f32 * (1.0 - heavy_target)).round() as usize;
                    samp[q].max(DELTA_MIN) * multiplier
                }
            }
        };
        Ok(delta.clamp(DELTA_MIN, DELTA_MAX))
    }

    pub fn executor(&self) -> Result<Executor> {
        match self.threads {
            None => Ok(Executor::Global),
            Some(n) => Executor::with_threads(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SsspError;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    fn weights(ws: &[f32]) -> Vec<Edge> {
        ws.iter().map(|&w| Edge::new(0, 1, w)).collect()
    }

    #[test]
    fn default_is_three_times_mean() {
        let cfg = SsspConfig::default();
        assert_eq!(cfg.resolve_delta(&weights(&[1.0, 2.0, 3.0])).unwrap(), 6.0);
        // no edges, or only zero weights: mean falls back to 1
        assert_eq!(cfg.resolve_delta(&[]).unwrap(), 3.0);
        assert_eq!(cfg.resolve_delta(&weights(&[0.0, 0.0])).unwrap(), 3.0);
    }

    #[test]
    fn quantile_picks_the_light_share() {
        let cfg = SsspConfig { delta: DeltaChoice::Quantile { heavy_target: 0.2, multiplier: 1.0 }, ..Default::default() };
        let ws: Vec<f32> = (1..=11).map(|w| w as f32).collect();
        // index round(10 * 0.8) = 8 -> weight 9
        assert_eq!(cfg.resolve_delta(&weights(&ws)).unwrap(), 9.0);
    }

    #[test]
    fn sample_size_limits_what_is_read() {
        let cfg = SsspConfig { sample_size: 2, ..Default::default() };
        assert_eq!(cfg.resolve_delta(&weights(&[1.0, 1.0, 1000.0])).unwrap(), 3.0);
    }

    #[test]
    fn derived_delta_is_clamped() {
        let cfg = SsspConfig { delta: DeltaChoice::Average { multiplier: 1e-9 }, ..Default::default() };
        assert_eq!(cfg.resolve_delta(&weights(&[1.0])).unwrap(), DELTA_MIN);
    }

    #[test]
    fn env_overlay() {
        let cfg = SsspConfig::default().overlay(env(&[("SSSP_DELTA", "2.5"), ("SSSP_THREADS", "1")])).unwrap();
        assert_eq!(cfg.delta, DeltaChoice::Fixed { delta: 2.5 });
        assert_eq!(cfg.threads, Some(1));
        assert!(matches!(cfg.executor().unwrap(), Executor::Sequential));

        let cfg = SsspConfig::default()
            .overlay(env(&[("SSSP_DELTA_MODE", "quantile"), ("SSSP_HEAVY_TARGET", "0.3"), ("SSSP_SAMPLE_SIZE", "64")]))
            .unwrap();
        assert_eq!(cfg.delta, DeltaChoice::Quantile { heavy_target: 0.3, multiplier: 1.0 });
        assert_eq!(cfg.sample_size, 64);

        let cfg = SsspConfig::default().overlay(env(&[("SSSP_DELTA_MULT", "5")])).unwrap();
        assert_eq!(cfg.delta, DeltaChoice::Average { multiplier: 5.0 });
    }

    #[test]
    fn env_overlay_rejects_garbage() {
        let err = SsspConfig::default().overlay(env(&[("SSSP_THREADS", "many")])).unwrap_err();
        assert!(matches!(err, SsspError::InvalidConfiguration(ConfigIssue::BadEnvValue { .. })));
        let err = SsspConfig::default().overlay(env(&[("SSSP_DELTA", "-1")])).unwrap_err();
        assert!(matches!(err, SsspError::InvalidConfiguration(ConfigIssue::NonPositiveDelta { .. })));
        let err = SsspConfig::default().overlay(env(&[("SSSP_DELTA_MODE", "fastest")])).unwrap_err();
        assert!(matches!(err, SsspError::InvalidConfiguration(ConfigIssue::BadEnvValue { .. })));
    }

    #[test]
    fn json_round_trip_and_partial_input() {
        let cfg = SsspConfig::with_delta(4.0).threads(2);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains(r#""mode":"fixed""#));
        assert_eq!(SsspConfig::from_json(&json).unwrap(), cfg);
        let partial = SsspConfig::from_json(r#"{"threads": 3}"#).unwrap();
        assert_eq!(partial.threads, Some(3));
        assert_eq!(partial.delta, DeltaChoice::default());
        assert!(SsspConfig::from_json(r#"{"delta": {"mode": "fixed", "delta": 0.0}}"#).is_err());
        assert!(SsspConfig::from_json("{").is_err());
    }
}
