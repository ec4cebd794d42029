use chrono::{DateTime, Utc};
use leptos::prelude::*;
use log::info;

use crate::components::graph_view::GraphView;
use crate::graph::{Note, display_name};

/// Seconds since the epoch for the first sample note.
const SAMPLE_EPOCH: i64 = 1_735_689_600;
const DAY: i64 = 86_400;

/// A small vault to explore: projects, tasks, a code note and an orphan.
fn sample_vault() -> Vec<Note> {
	let notes: [(&str, &str, &str); 10] = [
		(
			"Index.md",
			"Index.md",
			"Start here. See [[Projects]], [[Reading List]] and [[Daily Log]].",
		),
		(
			"Projects.md",
			"work/Projects.md",
			"#work Active: [[Graph View]], [[Search]]. Archived: [[Old Site]].",
		),
		(
			"Graph View.md",
			"work/Graph View.md",
			"#work #design Force layout like [[Search]] results.\n```rust\nfn tick() {}\n```",
		),
		(
			"Search.md",
			"work/Search.md",
			"#work TODO: index [[Graph View]] notes. Back to [[Projects]].",
		),
		(
			"Old Site.md",
			"archive/Old Site.md",
			"#archive Replaced by [[Projects]].",
		),
		(
			"Reading List.md",
			"personal/Reading List.md",
			"#reading #books Notes in [[Book Notes]], [[Book Notes]].",
		),
		(
			"Book Notes.md",
			"personal/Book Notes.md",
			"#reading Quotes collected while reading.",
		),
		(
			"Daily Log.md",
			"journal/Daily Log.md",
			"#journal - [ ] review [[Search]]\n- [x] sketch [[Graph View]]",
		),
		("Ideas.md", "Ideas.md", "#ideas Maybe link this to [[Index]] one day."),
		("Scratch.md", "Scratch.md", "Nothing here yet."),
	];

	notes
		.into_iter()
		.zip(0..)
		.map(|((name, path, content), day)| {
			let modified = DateTime::from_timestamp(SAMPLE_EPOCH + day * 3 * DAY, 0).unwrap_or_default();
			Note::new(name, path, Some(content)).with_modified(modified)
		})
		.collect()
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let notes = RwSignal::new(sample_vault());
	let current = RwSignal::new(Some("Index.md".to_owned()));

	let on_node_click = move |name: String| {
		info!("open {name}");
		let path = notes.with_untracked(|ns| {
			ns.iter()
				.find(|n| n.name == name)
				.map(|n| n.path.clone())
		});
		current.set(path);
	};

	let on_create_note = move |name: String| {
		info!("create {name}");
		let file = format!("{name}.md");
		notes.update(|ns| {
			if !ns.iter().any(|n| n.name == file) {
				ns.push(Note::new(file.clone(), file.clone(), Some("")).with_modified(Utc::now()));
			}
		});
	};

	let on_delete_note = move |path: String| {
		info!("delete {path}");
		notes.update(|ns| ns.retain(|n| n.path != path && n.name != path));
		current.update(|c| {
			if c.as_deref() == Some(path.as_str()) {
				*c = None;
			}
		});
	};

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
				<GraphView
					notes=notes
					current_file=current
					on_node_click=on_node_click
					on_create_note=on_create_note
					on_delete_note=on_delete_note
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Vault Graph"</h1>
					<p class="subtitle">
						{move || {
							current
								.get()
								.map(|path| format!("Current note: {}", display_name(&path)))
								.unwrap_or_else(|| "Click a note to open it.".to_owned())
						}}
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
