use leptos::prelude::*;

use crate::selection::Selection;

fn prompt(selection: &Selection) -> Option<String> {
	match selection.items() {
		[] => Some("Pick an item from any category.".into()),
		[first] => Some(format!("Now pick a partner for {first}.")),
		_ => None,
	}
}

/// Chosen items, the pair summary once complete, and the reset button.
///
/// Clicking a chosen item toggles it off through `on_toggle`.
#[component]
pub fn SelectionPanel(
	#[prop(into)] selection: Signal<Selection>,
	on_toggle: Callback<String>,
	on_reset: Callback<()>,
) -> impl IntoView {
	view! {
		<section class="selection-panel">
			<div class="selected-items">
				{move || {
					selection
						.with(|s| s.items().to_vec())
						.into_iter()
						.map(|item| {
							let toggle = item.clone();
							view! {
								<button class="chip" on:click=move |_| on_toggle.run(toggle.clone())>
									{item}
								</button>
							}
						})
						.collect_view()
				}}
			</div>
			<p class="hint">{move || selection.with(prompt)}</p>
			<Show when=move || selection.with(Selection::is_complete)>
				<p class="pair-summary">{move || selection.with(|s| s.summary().to_string())}</p>
			</Show>
			<button
				class="reset"
				disabled=move || selection.with(Selection::is_empty)
				on:click=move |_| on_reset.run(())
			>
				"Reset"
			</button>
		</section>
	}
}
