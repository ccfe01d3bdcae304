//! Dashboard view model derived from [`PollState`], and its terminal
//! rendering.

use std::fmt;

use oracle_core::models::analysis::{AlertLevel, OutbreakAnalysis};
use oracle_core::region::{MapRegion, map_highlights};

use crate::poller::PollState;

/// Visual treatment of an alert level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertStyle {
    pub name: &'static str,
    /// ANSI SGR sequence used for the level badge.
    pub ansi: &'static str,
}

const RESET: &str = "\x1b[0m";

pub fn alert_style(level: &AlertLevel) -> AlertStyle {
    match level {
        AlertLevel::Critical => AlertStyle {
            name: "critical",
            ansi: "\x1b[1;97;41m",
        },
        AlertLevel::High => AlertStyle {
            name: "high",
            ansi: "\x1b[1;31m",
        },
        AlertLevel::Moderate => AlertStyle {
            name: "moderate",
            ansi: "\x1b[1;33m",
        },
        AlertLevel::Low => AlertStyle {
            name: "low",
            ansi: "\x1b[32m",
        },
        AlertLevel::Minimal => AlertStyle {
            name: "minimal",
            ansi: "\x1b[36m",
        },
        AlertLevel::Unrecognized(_) => AlertStyle {
            name: "neutral",
            ansi: "\x1b[37m",
        },
    }
}

/// What the dashboard shows for one poll state.
///
/// A poll error does not hide the last good analysis; both are carried and
/// the error is rendered first.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub show_loading: bool,
    pub error: Option<String>,
    pub analysis: Option<AnalysisView>,
    pub last_updated: Option<jiff::Timestamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    pub analysis: OutbreakAnalysis,
    pub style: AlertStyle,
    pub map: Vec<(MapRegion, bool)>,
    /// Indexes into `analysis.recommendations` that need immediate action.
    pub urgent: Vec<usize>,
}

impl AnalysisView {
    pub fn new(analysis: OutbreakAnalysis) -> Self {
        let urgent = analysis
            .recommendations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_immediate())
            .map(|(i, _)| i)
            .collect();

        Self {
            style: alert_style(&analysis.alert_level),
            map: map_highlights(&analysis.location.region),
            urgent,
            analysis,
        }
    }

    pub fn highlighted(&self) -> Option<MapRegion> {
        self.map.iter().find(|(_, lit)| *lit).map(|(r, _)| *r)
    }
}

impl DashboardView {
    pub fn from_state(state: &PollState) -> Self {
        Self {
            show_loading: state.show_loading(),
            error: state.error.clone(),
            analysis: state.analysis.clone().map(AnalysisView::new),
            last_updated: state.last_updated,
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.show_loading {
            writeln!(f, "Analyzing global data streams...")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "\x1b[1;31mError:{RESET} {error}")?;
        }
        let Some(view) = &self.analysis else {
            return Ok(());
        };
        let a = &view.analysis;

        writeln!(
            f,
            "{}[{}]{RESET} {}  risk {}/100",
            view.style.ansi, a.alert_level, a.disease_name, a.risk_score
        )?;
        writeln!(
            f,
            "Location: {}, {} ({})",
            a.location.country, a.location.region, a.location.coordinates
        )?;

        let map: Vec<String> = view
            .map
            .iter()
            .map(|(region, lit)| {
                if *lit {
                    format!("[{}]", region.id())
                } else {
                    region.id().to_string()
                }
            })
            .collect();
        writeln!(f, "Map: {}", map.join(" "))?;

        writeln!(f, "Signals:")?;
        for signal in &a.signals {
            writeln!(
                f,
                "  {} [{}] {} ({})",
                signal.source, signal.severity, signal.description, signal.timestamp
            )?;
        }

        writeln!(
            f,
            "Analysis: transmission {}, spread {}, at risk {}",
            a.analysis.transmission_rate, a.analysis.spread_velocity, a.analysis.population_at_risk
        )?;
        writeln!(f, "  Compared to: {}", a.analysis.historical_comparison)?;

        writeln!(f, "Recommendations:")?;
        for (i, rec) in a.recommendations.iter().enumerate() {
            let marker = if view.urgent.contains(&i) { "!" } else { " " };
            writeln!(
                f,
                " {marker} [{}] {} for {} ({})",
                rec.priority, rec.action, rec.target_audience, rec.timeframe
            )?;
        }

        let p = &a.predictive_model;
        writeln!(
            f,
            "Projection: 7d {}, 30d {}, peak {}",
            p.seven_day_projection, p.thirty_day_projection, p.peak_date
        )?;
        writeln!(f, "  Affected: {}", p.affected_regions.join(", "))?;

        if let Some(ts) = self.last_updated {
            writeln!(f, "Last updated {ts}")?;
        }
        Ok(())
    }
}
