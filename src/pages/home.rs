use leptos::prelude::*;
use log::debug;

use crate::components::category_tabs::CategoryTabs;
use crate::components::force_graph::{CanvasSizing, ForceGraphCanvas, GraphData};
use crate::components::selection_panel::SelectionPanel;
use crate::selection::{SelectOutcome, Selection};
use crate::taxonomy::Taxonomy;

/// Picker wiring: selection state, tab fallback and the graph of the active tab.
#[component]
fn PairingExplorer(taxonomy: Taxonomy, sizing: CanvasSizing, draggable: bool) -> impl IntoView {
	let taxonomy = StoredValue::new(taxonomy);
	let selection = RwSignal::new(Selection::new());
	let chosen_tab = RwSignal::new(None::<String>);

	let eligible_tabs = Memo::new(move |_| {
		selection.with(|s| {
			taxonomy.with_value(|t| {
				s.eligible_categories(t)
					.into_iter()
					.map(|c| c.name.clone())
					.collect::<Vec<_>>()
			})
		})
	});

	// the picked tab wins while it is still eligible
	let active_tab = Memo::new(move |_| {
		let tabs = eligible_tabs.get();
		chosen_tab
			.get()
			.filter(|name| tabs.contains(name))
			.or_else(|| tabs.first().cloned())
	});

	let graph_data = Memo::new(move |_| {
		let Some(tab) = active_tab.get() else {
			return GraphData::default();
		};
		selection.with(|s| {
			taxonomy.with_value(|t| {
				t.category(&tab)
					.map(|c| GraphData::star(&c.name, s.eligible_items(c, &t.pairings)))
					.unwrap_or_default()
			})
		})
	});

	let select = Callback::new(move |item: String| {
		selection.update(|s| {
			let outcome = taxonomy.with_value(|t| s.select_item(&item, t));
			if outcome == SelectOutcome::Rejected {
				debug!("{item:?} has no pairing with {:?}", s.items());
			}
		});
	});
	let reset = Callback::new(move |_: ()| {
		selection.update(Selection::reset);
		chosen_tab.set(None);
	});
	let pick_tab = Callback::new(move |name: String| chosen_tab.set(Some(name)));

	view! {
		<div class="pairing-explorer">
			<SelectionPanel selection=selection on_toggle=select on_reset=reset />
			<Show when=move || active_tab.with(Option::is_some)>
				<CategoryTabs categories=eligible_tabs active=active_tab on_pick=pick_tab />
				<div class="graph-frame">
					<ForceGraphCanvas
						data=graph_data
						sizing=sizing
						on_select=select
						draggable=draggable
					/>
				</div>
			</Show>
		</div>
	}
}

/// Explorer page body for a given canvas sizing.
#[component]
fn Explorer(sizing: CanvasSizing, draggable: bool) -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="fullscreen-graph">
				<div class="graph-overlay">
					<h1>"Pair Explorer"</h1>
					<p class="subtitle">"Pick two items from different categories to read about the pair."</p>
				</div>
				{Taxonomy::bundled()
					.map(|taxonomy| {
						view! {
							<PairingExplorer taxonomy=taxonomy sizing=sizing draggable=draggable />
						}
					})}
			</div>
		</ErrorBoundary>
	}
}

/// Default Home Page: the canvas fills its frame and follows the window.
#[component]
pub fn Home() -> impl IntoView {
	view! { <Explorer sizing=CanvasSizing::Responsive draggable=false /> }
}

/// Fixed-size canvas with draggable nodes.
#[component]
pub fn Compact() -> impl IntoView {
	let sizing = CanvasSizing::Fixed {
		width: 640.0,
		height: 420.0,
	};
	view! { <Explorer sizing=sizing draggable=true /> }
}
