use leptos::prelude::*;

/// Tab strip over the categories that can still be picked from.
#[component]
pub fn CategoryTabs(
	#[prop(into)] categories: Signal<Vec<String>>,
	#[prop(into)] active: Signal<Option<String>>,
	on_pick: Callback<String>,
) -> impl IntoView {
	view! {
		<nav class="category-tabs">
			<For
				each=move || categories.get()
				key=|name| name.clone()
				children=move |name| {
					let tab = name.clone();
					let is_active = move || active.with(|a| a.as_deref() == Some(tab.as_str()));
					let pick = name.clone();
					view! {
						<button
							class="category-tab"
							class:active=is_active
							on:click=move |_| on_pick.run(pick.clone())
						>
							{name}
						</button>
					}
				}
			/>
		</nav>
	}
}
