//! Static overview of the demo database: size, structure and deployment.

use leptos::prelude::*;

/// A headline figure on the overview.
struct Stat {
	title: &'static str,
	value: &'static str,
	note: &'static str,
}

const STATS: [Stat; 4] = [
	Stat {
		title: "Database Size",
		value: "5.2 GB",
		note: "250,000 nodes, 1.2M relationships",
	},
	Stat {
		title: "User Nodes",
		value: "50,000",
		note: "With profile properties",
	},
	Stat {
		title: "Relationships",
		value: "850,000",
		note: "FOLLOWS, LIKES, COMMENTS_ON",
	},
	Stat {
		title: "Query Performance",
		value: "45ms",
		note: "Avg. response time",
	},
];

const STRUCTURE: [(&str, &str); 3] = [
	(
		"Node Labels",
		"User, Post, Comment, Group, Event, Location, Hashtag",
	),
	(
		"Relationship Types",
		"FOLLOWS, FRIENDS_WITH, POSTED, COMMENTED_ON, LIKES, MEMBER_OF, TAGGED_IN, LOCATED_AT",
	),
	(
		"Indexes",
		"User(id, email), Post(id), Group(name), Hashtag(name)",
	),
];

const DEPLOYMENT: [(&str, &str); 4] = [
	("Version", "Neo4j 5.11.0 Enterprise"),
	("Memory", "16GB Heap, 32GB Page Cache"),
	("Deployment", "Causal Cluster (3 nodes)"),
	("Storage", "SSD, 500GB allocated"),
];

fn facts(items: &'static [(&'static str, &'static str)]) -> impl IntoView {
	items
		.iter()
		.map(|(title, text)| {
			view! {
				<div>
					<h4>{*title}</h4>
					<p class="muted">{*text}</p>
				</div>
			}
		})
		.collect_view()
}

/// Overview cards for the demo database.
#[component]
pub fn DatabaseOverview() -> impl IntoView {
	view! {
		<section class="overview">
			<div class="analytics">
				{STATS
					.iter()
					.map(|s| {
						view! {
							<div class="card">
								<h4>{s.title}</h4>
								<div class="value">{s.value}</div>
								<p class="muted">{s.note}</p>
							</div>
						}
					})
					.collect_view()}
			</div>
			<div class="card">
				<h3>"Database Structure"</h3>
				<p class="muted">"Core components of our social network graph database"</p>
				{facts(&STRUCTURE)}
			</div>
			<div class="card">
				<h3>"Database Configuration"</h3>
				<p class="muted">"Neo4j instance configuration details"</p>
				<div class="facts">{facts(&DEPLOYMENT)}</div>
			</div>
		</section>
	}
}
