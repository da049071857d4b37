use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Nothing to connect here"</h1>
			<a href="/">"Back to the dots"</a>
		</div>
	}
}
