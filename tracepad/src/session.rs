use crate::{
    config::{Config, Reference},
    coords::{self, Sample},
    error::{Error, ErrorExt},
    event::{Event, Touch, TouchPhase},
    graphics::{Color, Size},
    history::History,
    overlay::{Overlay, ReferenceRequest, ReferenceTicket},
    render::{self, Surface},
    s,
    stroke::StrokeElement,
    ImageHandle,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Ready,
    MouseDraw,
    TouchDraw,
}

impl SessionState {
    pub fn drawing(&self) -> bool {
        !matches!(self, SessionState::Ready)
    }
}

/// What the frontend has to do after an event.
#[derive(Debug, PartialEq)]
pub enum Response {
    Nothing,
    /// A live segment was painted.
    Painted,
    /// The surface was rebuilt from the overlay and history.
    Redrawn,
    /// Load this picture and hand the result to [`Session::finish_reference`].
    LoadReference(ReferenceRequest),
    /// Show this text to the user.
    Notice(String),
}

/// Everything one drawing surface knows: the history, the overlay, and the
/// pen. Frontends own one of these and feed it events.
#[derive(Debug)]
pub struct Session<I: ImageHandle> {
    pub state: SessionState,
    pub color: Color,
    pub brush_width: f32,

    history: History,
    overlay: Option<Overlay<I>>,
    overlay_alpha: f32,
    palette: Vec<Color>,
    references: Vec<Reference>,

    generation: u64,
    pending: Option<ReferenceTicket>,
    rng: StdRng,
}

impl<I: ImageHandle> Session<I> {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: &Config, rng: StdRng) -> Self {
        Session {
            state: SessionState::default(),
            color: config.default_color,
            brush_width: config.brush_width,
            history: History::new(),
            overlay: None,
            overlay_alpha: config.overlay_alpha,
            palette: config.palette.clone(),
            references: config.reference_images.clone(),
            generation: 0,
            pending: None,
            rng,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn overlay(&self) -> Option<&Overlay<I>> {
        self.overlay.as_ref()
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn is_drawing(&self) -> bool {
        self.state.drawing()
    }

    pub fn is_loading_reference(&self) -> bool {
        self.pending.is_some()
    }

    /// Rebuilds `surface` from the overlay and history alone. Live segments of
    /// a stroke still in progress are dropped until it commits.
    pub fn redraw<S: Surface<I>>(&self, surface: &mut S) {
        render::redraw(
            surface,
            self.overlay.as_ref(),
            self.history.strokes(),
            self.overlay_alpha,
        );
    }

    fn element<S: Surface<I>>(&self, surface: &S, sample: Sample) -> StrokeElement {
        let pos = coords::client_to_surface(sample, surface.size());
        StrokeElement::new(pos, self.color, self.brush_width)
    }

    fn start_stroke<S: Surface<I>>(&mut self, surface: &mut S, sample: Sample) -> Response {
        let replaced_visible = self
            .history
            .in_progress()
            .map(|stroke| stroke.is_committable())
            .unwrap_or(false);

        let point = self.element(surface, sample);
        log::debug!("start stroke at {point}");
        self.history.begin_stroke(point);

        if replaced_visible {
            self.redraw(surface);
            Response::Redrawn
        } else {
            Response::Nothing
        }
    }

    fn continue_stroke<S: Surface<I>>(&mut self, surface: &mut S, sample: Sample) -> Response {
        let point = self.element(surface, sample);
        match self.history.extend_stroke(point) {
            Some(prev) => {
                render::paint_segment::<I, S>(surface, prev, point);
                Response::Painted
            }
            None => Response::Nothing,
        }
    }

    fn end_stroke<S: Surface<I>>(&mut self, surface: &mut S) -> Response {
        if self.history.commit_stroke() {
            // live segments are replaced by the committed stroke
            self.redraw(surface);
            Response::Redrawn
        } else {
            Response::Nothing
        }
    }

    fn handle_touch<S: Surface<I>>(&mut self, surface: &mut S, touch: Touch) -> Response {
        use SessionState as St;

        let (state, response) = match (self.state, touch.phase, touch.sample) {
            (_, TouchPhase::Start, Some(sample)) => {
                (St::TouchDraw, self.start_stroke(surface, sample))
            }

            (St::TouchDraw, TouchPhase::Move, Some(sample)) => {
                (St::TouchDraw, self.continue_stroke(surface, sample))
            }

            (St::TouchDraw, TouchPhase::End | TouchPhase::Cancel, _) => {
                (St::Ready, self.end_stroke(surface))
            }

            (state, _, _) => (state, Response::Nothing),
        };

        self.state = state;
        response
    }

    pub fn next<S: Surface<I>>(&mut self, surface: &mut S, event: Event) -> Response {
        use Event as E;
        use SessionState as St;

        if event.is_command() {
            log::debug!("command {event:?} in {:?}", self.state);
        }

        let (state, response) = match (self.state, event) {
            (_, E::PointerDown(sample)) => (St::MouseDraw, self.start_stroke(surface, sample)),

            (St::MouseDraw, E::PointerMove(sample)) => {
                (St::MouseDraw, self.continue_stroke(surface, sample))
            }

            (St::MouseDraw, E::PointerUp | E::PointerLeave) => {
                (St::Ready, self.end_stroke(surface))
            }

            (_, E::Touch(touch)) => {
                let response = self.handle_touch(surface, touch);
                (self.state, response)
            }

            (state, E::SelectColor(color)) => {
                log::debug!("select color {color}");
                self.color = color;
                (state, Response::Nothing)
            }

            (state, E::Clear) => (state, self.clear(surface)),
            (state, E::Undo) => (state, self.undo(surface)),
            (state, E::ShowReference) => (state, self.show_reference(surface)),

            (state, E::Resize(size)) => {
                self.resize(surface, size);
                (state, Response::Redrawn)
            }

            (state, _) => (state, Response::Nothing),
        };

        self.state = state;
        response
    }

    /// Empties the history, drops the overlay and abandons any picture still
    /// loading.
    pub fn clear<S: Surface<I>>(&mut self, surface: &mut S) -> Response {
        log::info!("clear");
        self.history.clear();
        self.overlay = None;
        self.invalidate_reference();
        self.redraw(surface);
        Response::Redrawn
    }

    pub fn undo<S: Surface<I>>(&mut self, surface: &mut S) -> Response {
        match self.history.undo() {
            Some(stroke) => {
                log::debug!("undo stroke of {} points", stroke.len());
                self.redraw(surface);
                Response::Redrawn
            }
            None => Response::Nothing,
        }
    }

    pub fn resize<S: Surface<I>>(&mut self, surface: &mut S, size: Size) {
        log::info!("resize to {size}");
        surface.resize(size);
        self.redraw(surface);
    }

    fn invalidate_reference(&mut self) -> ReferenceTicket {
        self.generation += 1;
        self.pending = None;
        ReferenceTicket {
            generation: self.generation,
        }
    }

    /// Clears the history and asks the frontend to load a random reference.
    /// The current overlay stays until the new picture arrives.
    pub fn show_reference<S: Surface<I>>(&mut self, surface: &mut S) -> Response {
        let Some(reference) = self.references.choose(&mut self.rng).cloned() else {
            log::warn!("no reference images configured");
            return Response::Notice(s!(NoReferenceImages));
        };

        log::info!("show reference {} from {}", reference.name, reference.path);
        self.history.clear();
        let ticket = self.invalidate_reference();
        self.pending = Some(ticket);
        self.redraw(surface);

        Response::LoadReference(ReferenceRequest { ticket, reference })
    }

    /// Installs a loaded reference, unless the request was overtaken by a
    /// clear or a newer request. On failure the user gets a notice and the
    /// session is left as it was.
    pub fn finish_reference<S: Surface<I>>(
        &mut self,
        surface: &mut S,
        request: ReferenceRequest,
        result: Result<I, Error>,
    ) -> Response {
        if self.pending != Some(request.ticket) {
            log::info!("discard stale reference {}", request.name());
            return Response::Nothing;
        }
        self.pending = None;

        match result {
            Ok(image) => {
                log::info!("install reference {} ({})", request.name(), image.size());
                self.overlay = Some(Overlay::new(image, request.reference.name));
                self.redraw(surface);
                Response::Redrawn
            }

            Err(err) => {
                let err = err.problem(s!(CouldNotLoadImage));
                let notice = err.message();
                err.display();
                Response::Notice(notice)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        graphics::{PixelPos, Rect},
        render::{DisplayList, DrawCommand},
        ImageLoader,
    };

    const SURFACE: Size = Size {
        width: 600.,
        height: 400.,
    };

    fn session() -> Session<Size> {
        Session::with_rng(&Config::new(), StdRng::seed_from_u64(7))
    }

    fn at(x: f32, y: f32) -> Sample {
        Sample::unscaled(x, y, SURFACE)
    }

    fn draw(
        session: &mut Session<Size>,
        surface: &mut DisplayList,
        color: Color,
        points: &[(f32, f32)],
    ) {
        session.next(surface, Event::SelectColor(color));
        let mut samples = points.iter().map(|&(x, y)| at(x, y));
        if let Some(first) = samples.next() {
            session.next(surface, Event::PointerDown(first));
        }
        for sample in samples {
            assert_eq!(session.next(surface, Event::PointerMove(sample)), Response::Painted);
        }
        session.next(surface, Event::PointerUp);
    }

    fn request(response: Response) -> ReferenceRequest {
        match response {
            Response::LoadReference(request) => request,
            other => panic!("expected a load request, got {other:?}"),
        }
    }

    struct FakeLoader;

    impl ImageLoader for FakeLoader {
        type Image = Size;

        async fn load(&self, path: &str) -> Result<Size, Error> {
            match path {
                "dog.png" => Ok(Size::new(300., 200.)),
                "cat.png" => Ok(Size::new(100., 400.)),
                "elephant.png" => Ok(Size::new(800., 400.)),
                _ => Err(Error::image_load(path)),
            }
        }
    }

    #[test]
    fn red_blue_undo_clear() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);

        draw(&mut session, &mut surface, Color::RED, &[(0., 0.), (10., 10.), (20., 0.)]);
        draw(&mut session, &mut surface, Color::BLUE, &[(5., 5.), (50., 50.)]);

        let strokes = session.history().strokes();
        assert_eq!(strokes.len(), 2);
        assert_eq!((strokes[0].len(), strokes[0].color()), (3, Color::RED));
        assert_eq!((strokes[1].len(), strokes[1].color()), (2, Color::BLUE));
        assert!(strokes.iter().all(|stroke| stroke.width() == 10.));

        assert_eq!(session.next(&mut surface, Event::Undo), Response::Redrawn);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().strokes()[0].color(), Color::RED);

        assert_eq!(session.next(&mut surface, Event::Clear), Response::Redrawn);
        assert!(session.history().is_empty());
        assert!(session.overlay().is_none());
        assert_eq!(surface.commands(), [DrawCommand::Clear(SURFACE)]);
    }

    #[test]
    fn tap_does_not_commit() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);

        session.next(&mut surface, Event::PointerDown(at(3., 3.)));
        assert!(session.is_drawing());
        assert_eq!(session.next(&mut surface, Event::PointerUp), Response::Nothing);
        assert!(!session.is_drawing());
        assert_eq!(session.history().len(), 0);
    }

    #[test]
    fn undo_on_empty_is_noop() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);
        assert_eq!(session.next(&mut surface, Event::Undo), Response::Nothing);
    }

    #[test]
    fn moves_without_down_are_ignored() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);
        assert_eq!(
            session.next(&mut surface, Event::PointerMove(at(1., 1.))),
            Response::Nothing
        );
        assert_eq!(session.next(&mut surface, Event::PointerUp), Response::Nothing);
        assert!(session.history().is_empty());
    }

    #[test]
    fn committed_stroke_redraws_like_live_segments() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);
        draw(&mut session, &mut surface, Color::GREEN, &[(1., 1.), (2., 2.), (3., 1.)]);

        let after_commit = surface.clone();
        session.redraw(&mut surface);
        assert_eq!(after_commit, surface);

        let polylines = surface.polylines().collect::<Vec<_>>();
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].0.len(), 3);
        assert_eq!(polylines[0].1, Color::GREEN);
    }

    #[test]
    fn color_applies_to_new_strokes_only() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);
        draw(&mut session, &mut surface, Color::RED, &[(0., 0.), (1., 1.)]);
        session.next(&mut surface, Event::SelectColor(Color::PURPLE));
        session.redraw(&mut surface);

        let colors = surface.polylines().map(|(_, c, _)| c).collect::<Vec<_>>();
        assert_eq!(colors, [Color::RED]);
        assert_eq!(session.color, Color::PURPLE);
    }

    #[test]
    fn samples_are_mapped_through_scale() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);
        // rendered at half size, 100px from the left of the viewport
        let bounds = Rect::new(100., 0., 300., 200.);

        session.next(
            &mut surface,
            Event::PointerDown(Sample::new(PixelPos { x: 100., y: 0. }, bounds)),
        );
        session.next(
            &mut surface,
            Event::PointerMove(Sample::new(PixelPos { x: 250., y: 100. }, bounds)),
        );
        session.next(&mut surface, Event::PointerUp);

        let stroke = &session.history().strokes()[0];
        assert_eq!(stroke.first().pos(), crate::SurfacePos { x: 0., y: 0. });
        assert_eq!(stroke.last().pos(), crate::SurfacePos { x: 300., y: 200. });
    }

    #[test]
    fn touch_strokes() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);

        session.next(&mut surface, Event::Touch(Touch::start(at(0., 0.))));
        assert!(session.is_drawing());
        session.next(&mut surface, Event::Touch(Touch::moved(at(4., 4.))));
        session.next(&mut surface, Event::Touch(Touch::moved(at(8., 0.))));
        assert_eq!(
            session.next(&mut surface, Event::Touch(Touch::cancel())),
            Response::Redrawn
        );
        assert!(!session.is_drawing());
        assert_eq!(session.history().strokes()[0].len(), 3);

        // a mouse release doesn't end a touch stroke
        session.next(&mut surface, Event::Touch(Touch::start(at(0., 0.))));
        session.next(&mut surface, Event::Touch(Touch::moved(at(1., 0.))));
        session.next(&mut surface, Event::PointerUp);
        assert!(session.is_drawing());
        session.next(&mut surface, Event::Touch(Touch::end()));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn surface_is_the_composite_of_overlay_and_history() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);
        draw(&mut session, &mut surface, Color::RED, &[(0., 0.), (1., 1.)]);

        session.next(&mut surface, Event::SelectColor(Color::BLUE));
        session.next(&mut surface, Event::PointerDown(at(5., 5.)));
        session.next(&mut surface, Event::PointerMove(at(6., 6.)));
        session.next(&mut surface, Event::Undo);

        let composite = |session: &Session<Size>, size: Size| {
            let mut expected = DisplayList::new(size);
            render::redraw(
                &mut expected,
                session.overlay(),
                session.history().strokes(),
                crate::OVERLAY_ALPHA,
            );
            expected
        };

        assert!(session.history().is_empty());
        assert_eq!(surface.commands(), composite(&session, SURFACE).commands());

        session.next(&mut surface, Event::PointerDown(at(1., 1.)));
        session.next(&mut surface, Event::PointerMove(at(9., 9.)));
        let resized = Size::new(200., 100.);
        session.next(&mut surface, Event::Resize(resized));
        assert_eq!(surface.commands(), composite(&session, resized).commands());

        // the live stroke still commits and then shows up through the history
        session.next(&mut surface, Event::PointerMove(at(12., 12.)));
        session.next(&mut surface, Event::PointerLeave);
        assert_eq!(session.history().len(), 1);
        assert_eq!(surface.commands(), composite(&session, resized).commands());
    }

    #[test]
    fn resize_redraws_at_new_size() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);
        let req = request(session.next(&mut surface, Event::ShowReference));
        let image = futures::executor::block_on(FakeLoader.load(req.path()));
        session.finish_reference(&mut surface, req, image);

        session.next(&mut surface, Event::Resize(Size::new(300., 300.)));
        let rect = surface.images().next().unwrap();
        assert!(rect.width <= 300. && rect.height <= 300.);
        assert!(rect.width == 300. || rect.height == 300.);
        assert_eq!(surface.commands()[0], DrawCommand::Clear(Size::new(300., 300.)));
    }

    #[test]
    fn show_reference_replaces_overlay_and_clears_history() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);

        let first = request(session.next(&mut surface, Event::ShowReference));
        let image = futures::executor::block_on(FakeLoader.load(first.path()));
        let first_name = first.name().to_string();
        assert_eq!(
            session.finish_reference(&mut surface, first, image),
            Response::Redrawn
        );
        assert_eq!(session.overlay().unwrap().name(), first_name);

        draw(&mut session, &mut surface, Color::BLACK, &[(0., 0.), (9., 9.)]);
        assert_eq!(session.history().len(), 1);

        let second = request(session.next(&mut surface, Event::ShowReference));
        assert!(session.history().is_empty());
        assert!(session.is_loading_reference());
        // the old overlay stays until the new picture is ready
        assert_eq!(session.overlay().unwrap().name(), first_name);

        let image = futures::executor::block_on(FakeLoader.load(second.path()));
        let expected = image.as_ref().map(|size| crate::graphics::fit_rect(*size, SURFACE)).unwrap();
        let second_name = second.name().to_string();
        session.finish_reference(&mut surface, second, image);

        assert_eq!(session.overlay().unwrap().name(), second_name);
        assert_eq!(surface.images().collect::<Vec<_>>(), [expected]);
        assert!(!session.is_loading_reference());
    }

    #[test]
    fn clear_discards_reference_in_flight() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);

        let req = request(session.next(&mut surface, Event::ShowReference));
        session.next(&mut surface, Event::Clear);

        let image = futures::executor::block_on(FakeLoader.load(req.path()));
        assert_eq!(
            session.finish_reference(&mut surface, req, image),
            Response::Nothing
        );
        assert!(session.overlay().is_none());
        assert_eq!(surface.images().count(), 0);
    }

    #[test]
    fn newer_request_wins() {
        let mut session = session();
        let mut surface = DisplayList::new(SURFACE);

        let old = request(session.next(&mut surface, Event::ShowReference));
        let new = request(session.next(&mut surface, Event::ShowReference));

        let new_name = new.name().to_string();
        session.finish_reference(&mut surface, new, Ok(Size::new(10., 10.)));
        assert_eq!(
            session.finish_reference(&mut surface, old, Ok(Size::new(20., 10.))),
            Response::Nothing
        );
        assert_eq!(session.overlay().unwrap().name(), new_name);
        assert_eq!(session.overlay().unwrap().image(), &Size::new(10., 10.));
    }

    #[test]
    fn failed_load_leaves_state_alone() {
        let mut config = Config::new();
        config.reference_images = vec![Reference::new("ghost", "ghost.png")];
        let mut session: Session<Size> = Session::with_rng(&config, StdRng::seed_from_u64(1));
        let mut surface = DisplayList::new(SURFACE);

        session.overlay = Some(Overlay::new(Size::new(50., 50.), "old"));
        let req = request(session.next(&mut surface, Event::ShowReference));
        draw(&mut session, &mut surface, Color::RED, &[(0., 0.), (3., 3.)]);

        let result = futures::executor::block_on(FakeLoader.load(req.path()));
        match session.finish_reference(&mut surface, req, result) {
            Response::Notice(text) => assert!(text.contains("ghost.png"), "{text}"),
            other => panic!("expected a notice, got {other:?}"),
        }

        assert_eq!(session.overlay().unwrap().name(), "old");
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_loading_reference());
    }

    #[test]
    fn no_references_is_a_notice() {
        let mut config = Config::new();
        config.reference_images.clear();
        let mut session: Session<Size> = Session::with_rng(&config, StdRng::seed_from_u64(1));
        let mut surface = DisplayList::new(SURFACE);
        draw(&mut session, &mut surface, Color::RED, &[(0., 0.), (3., 3.)]);

        assert!(matches!(
            session.next(&mut surface, Event::ShowReference),
            Response::Notice(_)
        ));
        assert_eq!(session.history().len(), 1);
    }
}
