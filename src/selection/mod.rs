pub mod filters;
pub mod ranking;
pub mod slots;

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogProvider};
use crate::comparison::{self, CompareError, ComparisonMatrix};
use crate::config::{ConfigError, EngineConfig, MAX_RANK_TOP};
use crate::scene::{SceneProfile, SceneProfiles};
use crate::types::decision::{
	Constraints, Decision, DecisionStatus, InputIssue, PickRequest, RankedEntry, RankingReport,
	SearchReport,
};
use crate::types::identifiers::RecordId;
pub use filters::{filter, ConstraintSet};
pub use ranking::{compare_candidates, normalize, rank, score_all, Scorer, WeightedSceneScorer};
pub use slots::assign_slots;

/// Request id used when the caller does not supply one.
pub const DEFAULT_REQUEST_ID: &str = "dev";

/// Where a request is in its lifecycle. Logged at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Received,
	Filtered,
	ScoredAndRanked,
	Decided,
	NoMatch,
	InvalidInput,
}

/// A request that passed input validation.
struct Accepted<'p> {
	profile: Option<&'p SceneProfile>,
	constraints: ConstraintSet,
}

pub struct DecisionEngine<S> {
	scorer: S,
	profiles: SceneProfiles,
	config: EngineConfig,
}

impl Default for DecisionEngine<WeightedSceneScorer> {
	fn default() -> Self {
		let config = EngineConfig::v0();
		Self {
			scorer: WeightedSceneScorer::new(config.neutral_floor),
			profiles: SceneProfiles::builtin(),
			config,
		}
	}
}

impl DecisionEngine<WeightedSceneScorer> {
	/// Fails when `config` does not pass [`EngineConfig::validated`].
	pub fn new(profiles: SceneProfiles, config: EngineConfig) -> Result<Self, ConfigError> {
		let config = config.validated()?;
		let scorer = WeightedSceneScorer::new(config.neutral_floor);
		Ok(Self { scorer, profiles, config })
	}
}

impl<S> DecisionEngine<S>
where
	S: Scorer,
{
	pub fn with_scorer(scorer: S, profiles: SceneProfiles, config: EngineConfig) -> Result<Self, ConfigError> {
		Ok(Self {
			scorer,
			profiles,
			config: config.validated()?,
		})
	}

	pub fn profiles(&self) -> &SceneProfiles {
		&self.profiles
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// RECEIVED → FILTERED → SCORED_AND_RANKED → DECIDED | NO_MATCH | INVALID_INPUT.
	///
	/// Invalid requests are answered without touching the catalog.
	pub fn pick(&self, catalog: &impl CatalogProvider, request: &PickRequest) -> Decision {
		let request_id = request_id_of(request);
		let constraints = self.echo(request);
		debug!(request_id = %request_id, stage = ?Stage::Received, "pick");

		let accepted = match self.accept(request, true) {
			Ok(accepted) => accepted,
			Err(issues) => {
				debug!(request_id = %request_id, stage = ?Stage::InvalidInput, issues = issues.len(), "pick");
				return Decision {
					request_id,
					status: DecisionStatus::InvalidInput,
					scene: request.scene.clone(),
					constraints,
					slots: Vec::new(),
					candidates_considered: 0,
					candidates_matched: 0,
					warning_count: 0,
					catalog_version: None,
					issues,
					unknown_ids: Vec::new(),
					message: Some("request rejected before catalog access".to_string()),
				};
			}
		};

		let snapshot = catalog.snapshot();
		let profile = accepted.profile.map(|p| p.name.clone());
		let unknown_ids = unknown_ids(&snapshot, &accepted.constraints);

		let survivors = filter(&snapshot, &accepted.constraints);
		debug!(request_id = %request_id, stage = ?Stage::Filtered, matched = survivors.len(), "pick");

		let (status, slots, message) = match accepted.profile {
			Some(profile) if !survivors.is_empty() => {
				let ranked = rank(score_all(&self.scorer, &survivors, profile));
				debug!(request_id = %request_id, stage = ?Stage::ScoredAndRanked, ranked = ranked.len(), "pick");

				let slots = assign_slots(&ranked, self.config.explain_top_k);
				(success_status(&snapshot), slots, None)
			}
			_ => (
				DecisionStatus::NoMatch,
				Vec::new(),
				Some(no_match_message(&accepted.constraints)),
			),
		};

		let stage = if status == DecisionStatus::NoMatch {
			Stage::NoMatch
		} else {
			Stage::Decided
		};
		info!(request_id = %request_id, stage = ?stage, status = ?status, slots = slots.len(), "pick");

		Decision {
			request_id,
			status,
			scene: profile,
			constraints,
			slots,
			candidates_considered: snapshot.len(),
			candidates_matched: survivors.len(),
			warning_count: snapshot.warning_count(),
			catalog_version: Some(snapshot.version().clone()),
			issues: Vec::new(),
			unknown_ids,
			message,
		}
	}

	/// Every survivor in rank order with its full breakdown, capped at `top`.
	pub fn rank(&self, catalog: &impl CatalogProvider, request: &PickRequest, top: usize) -> RankingReport {
		let request_id = request_id_of(request);
		let constraints = self.echo(request);
		debug!(request_id = %request_id, stage = ?Stage::Received, "rank");

		let accepted = self.accept(request, true).and_then(|accepted| {
			if (1..=MAX_RANK_TOP).contains(&top) {
				Ok(accepted)
			} else {
				Err(vec![InputIssue {
					field: "top".to_string(),
					message: format!("must be between 1 and {MAX_RANK_TOP}, got {top}"),
				}])
			}
		});

		let (filters, profile) = match accepted {
			Ok(Accepted {
				profile: Some(profile),
				constraints,
			}) => (constraints, profile),
			rejected => {
				let issues = rejected.err().unwrap_or_default();
				debug!(request_id = %request_id, stage = ?Stage::InvalidInput, "rank");
				return RankingReport {
					request_id,
					status: DecisionStatus::InvalidInput,
					scene: request.scene.clone(),
					constraints,
					candidates: Vec::new(),
					candidates_matched: 0,
					warning_count: 0,
					catalog_version: None,
					issues,
				};
			}
		};

		let snapshot = catalog.snapshot();
		let survivors = filter(&snapshot, &filters);
		debug!(request_id = %request_id, stage = ?Stage::Filtered, matched = survivors.len(), "rank");

		let ranked = rank(score_all(&self.scorer, &survivors, profile));
		debug!(request_id = %request_id, stage = ?Stage::ScoredAndRanked, ranked = ranked.len(), "rank");

		let candidates: Vec<RankedEntry> = ranked
			.into_iter()
			.take(top)
			.enumerate()
			.map(|(i, c)| RankedEntry {
				rank: i + 1,
				id: c.record.id.clone(),
				brand: c.record.brand.clone(),
				model: c.record.model.clone(),
				size_inch: c.record.size_inch,
				release_year: c.record.release_year,
				price: c.record.price,
				base_score: c.base_score,
				score: c.score,
				breakdown: c.breakdown,
				penalties: c.penalties,
			})
			.collect();

		let status = if survivors.is_empty() {
			DecisionStatus::NoMatch
		} else {
			success_status(&snapshot)
		};

		RankingReport {
			request_id,
			status,
			scene: Some(profile.name.clone()),
			constraints,
			candidates,
			candidates_matched: survivors.len(),
			warning_count: snapshot.warning_count(),
			catalog_version: Some(snapshot.version().clone()),
			issues: Vec::new(),
		}
	}

	/// Constraint filtering only; no scene is needed.
	pub fn search(&self, catalog: &impl CatalogProvider, request: &PickRequest) -> SearchReport {
		let request_id = request_id_of(request);
		let constraints = self.echo(request);

		let accepted = match self.accept(request, false) {
			Ok(accepted) => accepted,
			Err(issues) => {
				return SearchReport {
					request_id,
					status: DecisionStatus::InvalidInput,
					constraints,
					count: 0,
					records: Vec::new(),
					issues,
				};
			}
		};

		let snapshot = catalog.snapshot();
		let records: Vec<_> = filter(&snapshot, &accepted.constraints)
			.into_iter()
			.cloned()
			.collect();
		debug!(request_id = %request_id, stage = ?Stage::Filtered, matched = records.len(), "search");

		let status = if records.is_empty() {
			DecisionStatus::NoMatch
		} else {
			success_status(&snapshot)
		};

		SearchReport {
			request_id,
			status,
			constraints,
			count: records.len(),
			records,
			issues: Vec::new(),
		}
	}

	pub fn compare(
		&self,
		catalog: &impl CatalogProvider,
		ids: &[String],
	) -> Result<ComparisonMatrix, CompareError> {
		let ids: Vec<RecordId> = ids.iter().map(|id| RecordId::parse(id)).collect();
		let snapshot = catalog.snapshot();
		comparison::compare(&snapshot, &ids)
	}

	/// Effective constraints as echoed back to the caller, valid or not.
	fn echo(&self, request: &PickRequest) -> Constraints {
		Constraints {
			size_inch: request.size_inch,
			size_tolerance_inch: self.config.size_tolerance_inch,
			budget: request.budget,
			brands: normalized_brands(&request.brand),
			ids: request
				.ids
				.as_ref()
				.map(|ids| ids.iter().map(|id| RecordId::parse(id)).collect()),
		}
	}

	fn accept(&self, request: &PickRequest, require_scene: bool) -> Result<Accepted<'_>, Vec<InputIssue>> {
		let mut issues = Vec::new();

		let size = match request.size_inch {
			_ if carry_malformed(&mut issues, request, "size_inch") => None,
			None => {
				push_issue(&mut issues, "size_inch", "is required".to_string());
				None
			}
			Some(size) if size <= 0 => {
				push_issue(
					&mut issues,
					"size_inch",
					format!("must be a positive number of inches, got {size}"),
				);
				None
			}
			Some(size) => match u32::try_from(size) {
				Ok(size) => Some(size),
				Err(_) => {
					push_issue(&mut issues, "size_inch", format!("is out of range, got {size}"));
					None
				}
			},
		};

		let scene = request.scene.as_deref().map(str::trim).filter(|s| !s.is_empty());
		let profile = match scene {
			_ if carry_malformed(&mut issues, request, "scene") => None,
			None if require_scene => {
				push_issue(&mut issues, "scene", "is required".to_string());
				None
			}
			None => None,
			Some(name) => {
				let profile = self.profiles.get(name);
				if profile.is_none() {
					let known: Vec<&str> = self.profiles.names().collect();
					push_issue(
						&mut issues,
						"scene",
						format!("unknown scene '{name}', expected one of: {}", known.join(", ")),
					);
				}
				profile
			}
		};

		if !carry_malformed(&mut issues, request, "budget") {
			if let Some(budget) = request.budget {
				if !budget.is_finite() || budget < 0.0 {
					push_issue(&mut issues, "budget", format!("must be a non-negative number, got {budget}"));
				}
			}
		}

		if !carry_malformed(&mut issues, request, "brand") && request.brand.iter().any(|b| b.trim().is_empty()) {
			push_issue(&mut issues, "brand", "must not contain empty names".to_string());
		}

		if !carry_malformed(&mut issues, request, "ids") {
			if let Some(ids) = &request.ids {
				if ids.is_empty() {
					push_issue(&mut issues, "ids", "must list at least one identifier".to_string());
				} else if ids.iter().any(|id| id.trim().is_empty()) {
					push_issue(&mut issues, "ids", "must not contain empty identifiers".to_string());
				}
			}
		}

		carry_malformed(&mut issues, request, "request_id");

		match size {
			Some(size) if issues.is_empty() => {
				let mut constraints = ConstraintSet::new(size, self.config.size_tolerance_inch)
					.with_brands(&request.brand);
				if let Some(budget) = request.budget {
					constraints = constraints.with_budget(budget);
				}
				if let Some(ids) = &request.ids {
					constraints = constraints.with_ids(ids.iter().map(|id| RecordId::parse(id)));
				}
				Ok(Accepted { profile, constraints })
			}
			_ => Err(issues),
		}
	}
}

fn push_issue(issues: &mut Vec<InputIssue>, field: &str, message: String) {
	issues.push(InputIssue {
		field: field.to_string(),
		message,
	});
}

/// Reports `field` if it arrived with the wrong type; true when it did.
fn carry_malformed(issues: &mut Vec<InputIssue>, request: &PickRequest, field: &str) -> bool {
	match request.malformed_field(field) {
		Some(bad) => {
			issues.push(bad.clone());
			true
		}
		None => false,
	}
}

fn request_id_of(request: &PickRequest) -> String {
	request
		.request_id
		.as_deref()
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.unwrap_or(DEFAULT_REQUEST_ID)
		.to_string()
}

fn normalized_brands(brands: &[String]) -> Vec<String> {
	brands
		.iter()
		.map(|b| b.trim().to_lowercase())
		.filter(|b| !b.is_empty())
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}

fn success_status(catalog: &Catalog) -> DecisionStatus {
	if catalog.warning_count() > 0 {
		DecisionStatus::Degraded
	} else {
		DecisionStatus::Ok
	}
}

fn unknown_ids(catalog: &Catalog, constraints: &ConstraintSet) -> Vec<RecordId> {
	constraints
		.ids
		.iter()
		.flatten()
		.filter(|id| catalog.get(id).is_none())
		.cloned()
		.collect()
}

fn no_match_message(constraints: &ConstraintSet) -> String {
	let mut parts = vec![format!(
		"size {}\u{b1}{} in",
		constraints.size_inch, constraints.tolerance_inch
	)];
	if let Some(budget) = constraints.budget {
		parts.push(format!("price <= {budget}"));
	}
	if !constraints.brands.is_empty() {
		parts.push(format!("brand in [{}]", constraints.brands.join(", ")));
	}
	if let Some(ids) = &constraints.ids {
		parts.push(format!("{} requested id(s)", ids.len()));
	}
	format!("no catalog record satisfies: {}", parts.join("; "))
}
