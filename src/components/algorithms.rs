//! Graph algorithm showcase: pick a canned algorithm, "run" it, and inspect the
//! result graph drawn with the matching visual encoding.

use std::time::Duration;

use leptos::prelude::*;
use log::{debug, warn};

use crate::components::force_graph::{ForceGraphCanvas, GraphData, VisualizationMode};
use crate::data::{AlgorithmExample, AlgorithmKind, algorithm_catalog};

/// How long a simulated run takes before results appear.
pub const SIMULATED_RUN: Duration = Duration::from_secs(2);

fn kind_label(kind: AlgorithmKind) -> &'static str {
	match kind {
		AlgorithmKind::Centrality => "centrality",
		AlgorithmKind::Community => "community",
		AlgorithmKind::Pathfinding => "pathfinding",
	}
}

/// Tabbed panel over the algorithm catalog.
#[component]
pub fn AlgorithmPanel() -> impl IntoView {
	let catalog = match algorithm_catalog() {
		Ok(catalog) => catalog,
		Err(e) => {
			warn!("algorithms: failed to parse catalog: {e}");
			Vec::new()
		}
	};
	if catalog.is_empty() {
		return view! { <p class="empty">"No algorithm examples available."</p> }.into_any();
	}

	let tabs: Vec<(usize, String)> = catalog
		.iter()
		.enumerate()
		.map(|(i, a)| (i, a.name.clone()))
		.collect();
	let catalog = StoredValue::new(catalog);

	let (selected, set_selected) = signal(0usize);
	let (running, set_running) = signal(false);
	let (show_results, set_show_results) = signal(false);
	// Bumped on every tab change so a pending run for another tab is dropped.
	let generation = RwSignal::new(0u64);

	let current = Memo::new(move |_| catalog.with_value(|c| c.get(selected.get()).cloned()));
	let field = move |f: fn(&AlgorithmExample) -> String| current.get().map(|a| f(&a)).unwrap_or_default();

	let select = move |i: usize| {
		set_selected.set(i);
		set_running.set(false);
		set_show_results.set(false);
		generation.update(|g| *g += 1);
	};

	let run = move |_| {
		set_running.set(true);
		set_show_results.set(false);
		let started = generation.get_untracked();
		debug!("algorithms: simulating run {started}");
		set_timeout(
			move || {
				if generation.get_untracked() == started {
					set_running.set(false);
					set_show_results.set(true);
				}
			},
			SIMULATED_RUN,
		);
	};

	let data = Signal::derive(move || current.get().map(|a| a.visual_data).unwrap_or_else(GraphData::default));
	let mode = Signal::derive(move || current.get().map(|a| a.view).unwrap_or(VisualizationMode::Centrality));

	view! {
		<section class="card algorithms">
			<header>
				<h2>"Graph Algorithms"</h2>
				<p class="muted">"Explore graph algorithms for social network analysis"</p>
				<nav class="tabs">
					{tabs
						.into_iter()
						.map(|(i, name)| {
							view! {
								<button
									class="tab"
									class:active=move || selected.get() == i
									on:click=move |_| select(i)
								>
									{name}
								</button>
							}
						})
						.collect_view()}
				</nav>
			</header>

			<div class="algorithm">
				<h3>
					{move || field(|a| a.name.clone())}
					<span class="badge">{move || current.get().map(|a| kind_label(a.kind))}</span>
				</h3>
				<p class="muted">{move || field(|a| a.description.clone())}</p>
				<div class="query">
					<h4>"Cypher Implementation"</h4>
					<pre>{move || field(|a| a.query.clone())}</pre>
				</div>
				<button class="run" on:click=run disabled=move || running.get()>
					{move || {
						if running.get() {
							"Running Algorithm...".to_string()
						} else {
							format!("Run {}", field(|a| a.name.clone()))
						}
					}}
				</button>
			</div>

			<Show when=move || show_results.get()>
				<div class="results">
					<h3>"Algorithm Results"</h3>
					<div class="result-graph" style="height: 400px;">
						<ForceGraphCanvas data=data mode=mode show_labels=true />
					</div>
					<div class="metrics">
						{move || {
							current
								.get()
								.map(|a| a.metrics)
								.unwrap_or_default()
								.into_iter()
								.map(|m| {
									view! {
										<div class="metric">
											<h4>{m.name}</h4>
											<div class="value">{m.value}</div>
											<p class="muted">{m.description}</p>
										</div>
									}
								})
								.collect_view()
						}}
					</div>
				</div>
			</Show>
		</section>
	}
	.into_any()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_kind_has_a_label() {
		let catalog = algorithm_catalog().unwrap();
		for example in &catalog {
			let label = kind_label(example.kind);
			assert_eq!(serde_json::to_value(example.kind).unwrap(), label);
		}
	}
}
