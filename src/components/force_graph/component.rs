//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component owns one [`ForceLayoutEngine`] and one [`InteractionController`]
//! for its lifetime. Mouse and wheel events go through the controller, which
//! turns them into engine intents or view changes. An animation loop runs via
//! `requestAnimationFrame`, stepping the engine and redrawing each frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::GraphConfig;
use super::encoding::{NodeStyle, VisualizationMode};
use super::engine::{Bounds, ForceLayoutEngine, Intent, IntentSender, Point};
use super::interaction::InteractionController;
use super::model::Graph;
use super::render::{self, Frame};
use super::types::GraphData;

/// Wall time handed to the engine per animation frame.
const FRAME_DT: f64 = 0.016;
const DEFAULT_NODE_SIZE: f64 = 5.0;
/// Slider value that maps to the configured link distance.
const LINK_STRENGTH_UNIT: f64 = 50.0;
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// What the primary mouse button is currently doing.
enum Gesture {
	Idle,
	Drag(String),
	Pan { last: Point },
}

/// Engine, controller, and per-frame view state shared by all handlers.
struct GraphContext {
	engine: ForceLayoutEngine,
	controller: InteractionController,
	intents: IntentSender,
	styles: Vec<NodeStyle>,
	mode: VisualizationMode,
	base_size: f64,
	show_labels: bool,
	hovered: Option<usize>,
	gesture: Gesture,
	reheat_alpha: f64,
}

impl GraphContext {
	/// Binds new data: attributes only when the identity matches, a fresh layout otherwise.
	fn load(&mut self, data: &GraphData) {
		let graph = match Graph::from_data(data) {
			Ok(graph) => graph,
			Err(e) => {
				warn!("force-graph: rejected graph data: {e}");
				return;
			}
		};

		let same = self.engine.graph().is_some_and(|g| g.same_identity(&graph));
		if same {
			if let Err(e) = self.engine.rebind(graph) {
				warn!("force-graph: rebind failed: {e}");
				return;
			}
		} else {
			self.controller.bind_graph(&graph);
			self.engine.initialize(graph, self.controller.bounds());
			self.hovered = None;
			self.gesture = Gesture::Idle;
		}
		self.restyle();
	}

	fn restyle(&mut self) {
		let Some(graph) = self.engine.graph() else {
			return;
		};
		if let Err(e) = self.mode.validate(graph) {
			warn!("force-graph: {e}");
		}
		self.styles = render::node_styles(graph, self.mode, self.base_size);
	}

	/// Node under a screen-space point.
	fn hit(&self, p: Point) -> Option<usize> {
		let styles = &self.styles;
		self.engine.node_at(self.controller.screen_to_graph(p), |i| {
			styles.get(i).map_or(0.0, |s| s.radius)
		})
	}

	fn node_id(&self, index: usize) -> Option<String> {
		self.engine.graph()?.node(index).map(|n| n.id.clone())
	}

	fn draw(&self, ctx: &CanvasRenderingContext2d) {
		let (Some(graph), Some(state)) = (self.engine.graph(), self.engine.state()) else {
			return;
		};
		let frame = Frame {
			graph,
			state,
			styles: &self.styles,
			mode: self.mode,
			transform: self.controller.transform(),
			bounds: self.controller.bounds(),
			show_labels: self.show_labels,
			hovered: self.hovered,
		};
		render::render(&frame, ctx);
	}

	fn end_gesture(&mut self) {
		if let Gesture::Drag(id) = std::mem::replace(&mut self.gesture, Gesture::Idle) {
			if let Err(e) = self.controller.on_drag_end(&id) {
				warn!("force-graph: {e}");
			}
		}
	}
}

fn pointer(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn window_size(window: &Window) -> Bounds {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	let fallback = Bounds::default();
	Bounds::new(
		dim(window.inner_width(), fallback.width),
		dim(window.inner_height(), fallback.height),
	)
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal. New data with the same node
/// ids and links only swaps the attributes, so switching between algorithm
/// outputs does not restart the layout. `mode` picks the visual encoding.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize automatically with the
/// window. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	/// Graph to draw.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Visual encoding; defaults to the plain network view.
	#[prop(into, optional)]
	mode: MaybeProp<VisualizationMode>,
	/// Draw node names.
	#[prop(into, optional)]
	show_labels: MaybeProp<bool>,
	/// Minimum node radius.
	#[prop(into, optional)]
	node_size: MaybeProp<f64>,
	/// Spring slider value; 50 keeps the configured link distance.
	#[prop(into, optional)]
	link_strength: MaybeProp<f64>,
	/// Physics and interaction tunables.
	#[prop(optional)]
	config: GraphConfig,
	/// Fill the window and follow its size.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed canvas width in pixels.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed canvas height in pixels.
	#[prop(default = None)]
	height: Option<f64>,
	/// Show zoom in/out/reset buttons.
	#[prop(default = true)]
	controls: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

	let engine = ForceLayoutEngine::new(config.simulation.clone());
	let intents = engine.intent_sender();
	let controller =
		InteractionController::new(intents.clone(), Bounds::default(), config.interaction.clone());
	let zoom = controller.zoom_controls();
	let base_distance = config.simulation.link_distance;

	let context = Rc::new(RefCell::new(GraphContext {
		engine,
		controller,
		intents,
		styles: Vec::new(),
		mode: mode.get_untracked().unwrap_or_default(),
		base_size: node_size.get_untracked().unwrap_or(DEFAULT_NODE_SIZE),
		show_labels: show_labels.get_untracked().unwrap_or(false),
		hovered: None,
		gesture: Gesture::Idle,
		reheat_alpha: config.interaction.resize_alpha,
	}));

	let alive = Rc::new(Cell::new(true));
	let mounted = Rc::new(Cell::new(false));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let (context_init, alive_init, resize_init) = (context.clone(), alive.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if mounted.replace(true) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let bounds = if fullscreen {
			window_size(&window)
		} else {
			let parent = canvas.parent_element();
			Bounds::new(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.filter(|w| *w > 0.0)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.filter(|h| *h > 0.0)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(bounds.width as u32);
		canvas.set_height(bounds.height as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("force-graph: canvas has no 2d context");
			return;
		};

		context_init.borrow_mut().controller.on_resize(bounds);
		info!("force-graph: mounted at {}x{}", bounds.width, bounds.height);

		if fullscreen {
			let (context_resize, canvas_resize, alive_resize) =
				(context_init.clone(), canvas.clone(), alive_init.clone());
			*resize_init.borrow_mut() = Some(Closure::new(move || {
				if !alive_resize.get() {
					return;
				}
				let Some(win) = web_sys::window() else {
					return;
				};
				let bounds = window_size(&win);
				canvas_resize.set_width(bounds.width as u32);
				canvas_resize.set_height(bounds.height as u32);
				context_resize.borrow_mut().controller.on_resize(bounds);
			}));
			if let Some(ref cb) = *resize_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, alive_anim) =
			(context_init.clone(), animate.clone(), alive_init.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.get() {
				return;
			}
			{
				let mut c = context_anim.borrow_mut();
				// Not initialized until the first valid data arrives.
				let _ = c.engine.step(FRAME_DT);
				c.draw(&ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_data = context.clone();
	Effect::new(move |_| {
		let data = data.get();
		context_data.borrow_mut().load(&data);
	});

	let context_style = context.clone();
	Effect::new(move |_| {
		let mode = mode.get().unwrap_or_default();
		let base_size = node_size.get().unwrap_or(DEFAULT_NODE_SIZE);
		let labels = show_labels.get().unwrap_or(false);
		let mut c = context_style.borrow_mut();
		c.show_labels = labels;
		if c.mode != mode || c.base_size != base_size || c.styles.is_empty() {
			c.mode = mode;
			c.base_size = base_size;
			c.restyle();
		}
	});

	let context_links = context.clone();
	Effect::new(move |prev: Option<Option<f64>>| {
		let strength = link_strength.get();
		if let Some(s) = strength.filter(|_| prev != Some(strength)) {
			let mut c = context_links.borrow_mut();
			c.engine.set_link_distance(base_distance * s / LINK_STRENGTH_UNIT);
			let alpha = c.reheat_alpha;
			c.intents.send(Intent::Reheat(alpha));
		}
		strength
	});

	// Cleanup runs on the thread that created the component.
	let teardown = SendWrapper::new((alive, resize_cb));
	on_cleanup(move || {
		let (alive, resize_cb) = teardown.take();
		alive.set(false);
		let listener = resize_cb.borrow_mut().take();
		if let (Some(cb), Some(window)) = (listener, web_sys::window()) {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let p = pointer(&canvas, &ev);
		let mut c = context_md.borrow_mut();
		match c.hit(p).and_then(|i| c.node_id(i)) {
			Some(id) => match c.controller.on_drag_start(&id, p) {
				Ok(()) => c.gesture = Gesture::Drag(id),
				Err(e) => warn!("force-graph: {e}"),
			},
			None => c.gesture = Gesture::Pan { last: p },
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let p = pointer(&canvas, &ev);
		let mut guard = context_mm.borrow_mut();
		let c = &mut *guard;
		match &mut c.gesture {
			Gesture::Drag(id) => {
				if let Err(e) = c.controller.on_drag_move(id, p) {
					warn!("force-graph: {e}");
				}
			}
			Gesture::Pan { last } => {
				let (dx, dy) = (p.x - last.x, p.y - last.y);
				*last = p;
				c.controller.on_pan(dx, dy);
			}
			Gesture::Idle => {}
		}
		if matches!(c.gesture, Gesture::Idle) {
			c.hovered = c.hit(p);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		context_mu.borrow_mut().end_gesture();
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut c = context_ml.borrow_mut();
		c.end_gesture();
		c.hovered = None;
	};

	let context_wh = context;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let p = pointer(&canvas, &ev);
		let factor = if ev.delta_y() > 0.0 {
			WHEEL_ZOOM_OUT
		} else {
			WHEEL_ZOOM_IN
		};
		context_wh.borrow_mut().controller.on_zoom(factor, p);
	};

	let buttons = controls.then(|| {
		let (zoom_in, zoom_out, reset) = (zoom.clone(), zoom.clone(), zoom);
		view! {
			<div class="graph-controls">
				<button title="Zoom in" on:click=move |_| zoom_in.zoom_in()>"+"</button>
				<button title="Zoom out" on:click=move |_| zoom_out.zoom_out()>"−"</button>
				<button title="Reset view" on:click=move |_| reset.reset()>"⟲"</button>
			</div>
		}
	});

	view! {
		<div class="force-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			{buttons}
		</div>
	}
}
