use leptos::prelude::*;

use crate::components::mosaic_intro::MosaicIntro;
use crate::components::tree_scene::TreeScene;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	// Flipped once by the intro; the scene stays idle until then.
	let (ready, set_ready) = signal(false);

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

			<div class="scene">
				<TreeScene ready=ready />
				<div class="stamp">
					<h1>"Connect the dots"</h1>
				</div>
			</div>
			<MosaicIntro on_done=move |_| set_ready.set(true) />
		</ErrorBoundary>
	}
}
