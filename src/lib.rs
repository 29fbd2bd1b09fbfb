//! social-graph: Interactive dashboard for a social-network graph database demo.
//!
//! This crate provides a WASM-based dashboard that renders the user network with a
//! physics-based layout, pan/zoom, node dragging, and per-algorithm visual
//! encodings. Side panels cover the database overview, its schema, canned query
//! results and a showcase of graph algorithm runs.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod data;

pub use components::algorithms::AlgorithmPanel;
pub use components::overview::DatabaseOverview;
pub use components::queries::QueryExplorer;
pub use components::schema::SchemaViewer;
pub use components::force_graph::{
	ForceGraphCanvas, Graph, GraphConfig, GraphData, GraphLink, GraphNode, VisualizationMode,
};
pub use data::AnalyticsSummary;

/// Seed for the generated network when the page embeds none.
const NETWORK_SEED: u64 = 42;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("social-graph: logging initialized");
}

/// Parses the JSON body of `<script id="{id}">`.
///
/// Returns `None` when the element is absent; logs and returns `None` when it
/// does not parse.
fn load_json_script<T: DeserializeOwned>(id: &str) -> Option<T> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<T>(&json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("social-graph: failed to parse #{id}: {e}");
			None
		}
	}
}

/// Network data embedded in the page, or a generated network.
fn load_graph_data() -> GraphData {
	match load_json_script::<GraphData>("graph-data") {
		Some(data) => {
			info!(
				"social-graph: loaded {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			data
		}
		None => data::network_data(NETWORK_SEED),
	}
}

#[component]
fn AnalyticsCards(summary: Option<AnalyticsSummary>) -> impl IntoView {
	let Some(summary) = summary else {
		return view! { <p class="muted">"Analytics unavailable."</p> }.into_any();
	};
	let influential = summary
		.most_influential
		.map(|i| (i.name, format!("PageRank {:.2}", i.score)))
		.unwrap_or_else(|| ("n/a".to_string(), String::new()));

	view! {
		<div class="analytics">
			<div class="card">
				<h4>"Network Size"</h4>
				<div class="value">{summary.total_users}</div>
				<p class="muted">{format!("{} connections", summary.total_connections)}</p>
			</div>
			<div class="card">
				<h4>"Communities"</h4>
				<div class="value">{summary.communities}</div>
				<p class="muted">{format!("{:.1} connections per user", summary.avg_connections)}</p>
			</div>
			<div class="card">
				<h4>"Network Density"</h4>
				<div class="value">{format!("{:.1}%", summary.density * 100.0)}</div>
				<p class="muted">"Share of possible connections"</p>
			</div>
			<div class="card">
				<h4>"Most Influential"</h4>
				<div class="value">{influential.0}</div>
				<p class="muted">{influential.1}</p>
			</div>
		</div>
	}
	.into_any()
}

/// Side panel tabs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Panel {
	Overview,
	Schema,
	Queries,
	Algorithms,
}

impl Panel {
	const ALL: [Panel; 4] = [Panel::Overview, Panel::Schema, Panel::Queries, Panel::Algorithms];

	fn label(self) -> &'static str {
		match self {
			Panel::Overview => "Overview",
			Panel::Schema => "Schema",
			Panel::Queries => "Queries",
			Panel::Algorithms => "Algorithms",
		}
	}
}

/// Main application component.
/// Loads network data and configuration from the DOM and renders the dashboard.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data();
	let config = load_json_script::<GraphConfig>("graph-config").unwrap_or_default();
	let summary = match Graph::from_data(&graph_data) {
		Ok(graph) => Some(AnalyticsSummary::from_graph(&graph)),
		Err(e) => {
			warn!("social-graph: network data is invalid: {e}");
			None
		}
	};
	let graph_signal = Signal::derive(move || graph_data.clone());

	let (mode, set_mode) = signal(VisualizationMode::PageRank);
	let (node_size, set_node_size) = signal(5.0);
	let (link_strength, set_link_strength) = signal(50.0);
	let (show_labels, set_show_labels) = signal(true);
	let (panel, set_panel) = signal(Panel::Overview);

	let on_mode = move |ev: web_sys::Event| {
		let choice = event_target_value(&ev)
			.parse::<usize>()
			.ok()
			.and_then(|i| VisualizationMode::NETWORK_VIEWS.get(i).copied());
		if let Some(m) = choice {
			set_mode.set(m);
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Social Network Graph Analytics" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<main class="dashboard">
			<header>
				<h1>"Social Network Graph Database"</h1>
				<p class="subtitle">"Explore the power of Neo4j for modeling and analyzing social network data"</p>
			</header>

			<div class="network">
				<aside class="controls">
					<label>
						"Visualization"
						<select on:change=on_mode>
							{VisualizationMode::NETWORK_VIEWS
								.iter()
								.enumerate()
								.map(|(i, m)| {
									let m = *m;
									view! {
										<option value=i.to_string() selected=move || mode.get() == m>
											{m.label()}
										</option>
									}
								})
								.collect_view()}
						</select>
					</label>
					<label>
						{move || format!("Node Size: {}", node_size.get())}
						<input
							type="range"
							min="1"
							max="20"
							step="1"
							prop:value=move || node_size.get().to_string()
							on:input=move |ev| {
								if let Ok(v) = event_target_value(&ev).parse() {
									set_node_size.set(v);
								}
							}
						/>
					</label>
					<label>
						{move || format!("Link Strength: {}", link_strength.get())}
						<input
							type="range"
							min="10"
							max="100"
							step="5"
							prop:value=move || link_strength.get().to_string()
							on:input=move |ev| {
								if let Ok(v) = event_target_value(&ev).parse() {
									set_link_strength.set(v);
								}
							}
						/>
					</label>
					<label class="toggle">
						<input
							type="checkbox"
							prop:checked=move || show_labels.get()
							on:change=move |ev| set_show_labels.set(event_target_checked(&ev))
						/>
						"Show Labels"
					</label>
				</aside>

				<div class="graph-panel" style="height: 600px;">
					<ForceGraphCanvas
						data=graph_signal
						mode=mode
						node_size=node_size
						link_strength=link_strength
						show_labels=show_labels
						config=config
					/>
				</div>

				<AnalyticsCards summary=summary />
			</div>

			<aside class="panels">
				<nav class="tabs">
					{Panel::ALL
						.iter()
						.map(|p| {
							let p = *p;
							view! {
								<button
									class="tab"
									class:active=move || panel.get() == p
									on:click=move |_| set_panel.set(p)
								>
									{p.label()}
								</button>
							}
						})
						.collect_view()}
				</nav>
				{move || match panel.get() {
					Panel::Overview => view! { <DatabaseOverview /> }.into_any(),
					Panel::Schema => view! { <SchemaViewer /> }.into_any(),
					Panel::Queries => view! { <QueryExplorer /> }.into_any(),
					Panel::Algorithms => view! { <AlgorithmPanel /> }.into_any(),
				}}
			</aside>
		</main>
	}
}
