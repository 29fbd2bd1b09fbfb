//! Query explorer: canned Cypher queries with a simulated run and a result table.

use std::time::Duration;

use leptos::prelude::*;
use log::{debug, warn};

use crate::data::{QueryExample, query_catalog};

/// How long a simulated query takes before results appear.
pub const SIMULATED_QUERY: Duration = Duration::from_millis(1500);

/// "Showing 5 of 12 results".
fn results_caption(query: &QueryExample) -> String {
	format!(
		"Showing {} of {} results",
		query.results.rows.len(),
		query.results.total
	)
}

/// Tabbed panel over the query catalog.
#[component]
pub fn QueryExplorer() -> impl IntoView {
	let queries = match query_catalog() {
		Ok(queries) => queries,
		Err(e) => {
			warn!("queries: failed to parse catalog: {e}");
			Vec::new()
		}
	};
	if queries.is_empty() {
		return view! { <p class="empty">"No query examples available."</p> }.into_any();
	}

	let tabs: Vec<(usize, String)> = queries
		.iter()
		.enumerate()
		.map(|(i, q)| (i, q.name.clone()))
		.collect();
	let queries = StoredValue::new(queries);

	let (selected, set_selected) = signal(0usize);
	let (running, set_running) = signal(false);
	let (show_results, set_show_results) = signal(false);
	let generation = RwSignal::new(0u64);

	let current = Memo::new(move |_| queries.with_value(|q| q.get(selected.get()).cloned()));
	let field = move |f: fn(&QueryExample) -> String| current.get().map(|q| f(&q)).unwrap_or_default();

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
		debug!("queries: simulating run {started}");
		set_timeout(
			move || {
				if generation.get_untracked() == started {
					set_running.set(false);
					set_show_results.set(true);
				}
			},
			SIMULATED_QUERY,
		);
	};

	view! {
		<section class="card queries">
			<header>
				<h2>"Query Explorer"</h2>
				<p class="muted">"Explore common social network analysis queries in Cypher"</p>
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

			<div class="query">
				<h3>{move || field(|q| q.name.clone())}</h3>
				<p class="muted">{move || field(|q| q.description.clone())}</p>
				<pre>{move || field(|q| q.query.clone())}</pre>
				<button class="run" on:click=run disabled=move || running.get()>
					{move || if running.get() { "Running..." } else { "Run Query" }}
				</button>
			</div>

			<Show when=move || show_results.get()>
				{move || {
					current
						.get()
						.map(|q| {
							let caption = results_caption(&q);
							view! {
								<div class="results">
									<h3>
										"Query Results"
										<span class="badge">{format!("{} ms", q.execution_time)}</span>
									</h3>
									<table>
										<thead>
											<tr>
												{q.results.columns.into_iter().map(|c| view! { <th>{c}</th> }).collect_view()}
											</tr>
										</thead>
										<tbody>
											{q
												.results
												.rows
												.into_iter()
												.map(|row| {
													view! {
														<tr>
															{row
																.into_iter()
																.map(|cell| view! { <td>{cell.to_string()}</td> })
																.collect_view()}
														</tr>
													}
												})
												.collect_view()}
										</tbody>
									</table>
									<p class="muted">
										<span>{caption}</span>
										<span>{format!("Query Plan: {}", q.query_plan)}</span>
									</p>
								</div>
							}
						})
				}}
			</Show>
		</section>
	}
	.into_any()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn caption_counts_shown_rows() {
		let queries = query_catalog().unwrap();
		assert_eq!(results_caption(&queries[0]), "Showing 5 of 12 results");
		let path = queries.iter().find(|q| q.id == "shortest-path").unwrap();
		assert_eq!(results_caption(path), "Showing 4 of 4 results");
	}
}
