//! Schema viewer: the database's labels and relationship types, drawn with the
//! same force layout as the network, plus the Cypher that defines them.

use leptos::prelude::*;
use log::warn;

use crate::components::force_graph::{
	ForceGraphCanvas, GraphConfig, InteractionConfig, SimulationConfig, VisualizationMode,
};
use crate::data::graph_schema;

/// Radius floor for label nodes; property count adds on top.
const LABEL_NODE_SIZE: f64 = 20.0;

/// Layout for a handful of large label nodes.
pub fn schema_config() -> GraphConfig {
	GraphConfig {
		simulation: SimulationConfig {
			link_distance: 150.0,
			charge_strength: -800.0,
			collide_radius: 80.0,
			..Default::default()
		},
		interaction: InteractionConfig::default(),
	}
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SchemaTab {
	Visual,
	Cypher,
}

/// Visual and Cypher views of the schema fixture.
#[component]
pub fn SchemaViewer() -> impl IntoView {
	let schema = match graph_schema() {
		Ok(schema) => schema,
		Err(e) => {
			warn!("schema: failed to parse fixture: {e}");
			return view! { <p class="empty">"Schema unavailable."</p> }.into_any();
		}
	};

	let (tab, set_tab) = signal(SchemaTab::Visual);
	let data = schema.graph_data();
	let graph_signal = Signal::derive(move || data.clone());
	let cypher = schema.cypher.clone();

	let labels = schema
		.labels
		.into_iter()
		.map(|label| {
			view! {
				<li>
					<span class="swatch" style=format!("background: {};", label.color)></span>
					<strong>{label.id}</strong>
					<span class="muted">{label.properties.join(", ")}</span>
				</li>
			}
		})
		.collect_view();
	let relationships = schema
		.relationships
		.into_iter()
		.map(|r| view! { <li>{format!("({})-[:{}]->({})", r.source, r.kind, r.target)}</li> })
		.collect_view();

	view! {
		<section class="card schema">
			<header>
				<h2>"Database Schema"</h2>
				<p class="muted">"Visual representation of the social network graph schema"</p>
				<nav class="tabs">
					<button
						class="tab"
						class:active=move || tab.get() == SchemaTab::Visual
						on:click=move |_| set_tab.set(SchemaTab::Visual)
					>
						"Visual Schema"
					</button>
					<button
						class="tab"
						class:active=move || tab.get() == SchemaTab::Cypher
						on:click=move |_| set_tab.set(SchemaTab::Cypher)
					>
						"Cypher Schema"
					</button>
				</nav>
			</header>

			<Show
				when=move || tab.get() == SchemaTab::Visual
				fallback=move || view! { <pre class="cypher">{cypher.clone()}</pre> }
			>
				<div class="schema-graph" style="height: 600px;">
					<ForceGraphCanvas
						data=graph_signal
						mode=VisualizationMode::Network
						node_size=LABEL_NODE_SIZE
						show_labels=true
						config=schema_config()
					/>
				</div>
			</Show>

			<div class="schema-legend">
				<h4>"Node Labels"</h4>
				<ul>{labels}</ul>
				<h4>"Relationship Types"</h4>
				<ul>{relationships}</ul>
			</div>
		</section>
	}
	.into_any()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::{Bounds, ForceLayoutEngine, Graph};

	#[test]
	fn schema_layout_settles() {
		let schema = graph_schema().unwrap();
		let graph = Graph::from_data(&schema.graph_data()).unwrap();
		let mut engine = ForceLayoutEngine::new(schema_config().simulation);
		engine.initialize(graph, Bounds::new(600.0, 600.0));
		engine.run(10_000).unwrap();

		assert!(engine.is_converged());
		let user = engine.position("User").unwrap();
		let post = engine.position("Post").unwrap();
		assert!(user.distance(post) > 100.0);
	}
}
