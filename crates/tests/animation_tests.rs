//! Drive whole animations through a scripted host
#[cfg(test)]
#[expect(clippy::indexing_slicing, reason = "Tests aren't so strict")]
mod animation {
    use std::collections::VecDeque;

    use particle_animator::animator::Animator;
    use particle_animator::canvas::{Canvas, Pixel, Size};
    use particle_animator::config::AnimatorConfig;
    use particle_animator::errors::AnimatorError;
    use particle_animator::host::{Host, HostEvent};
    use rand::SeedableRng as _;

    /// A single step of a scripted run.
    enum Step {
        /// Deliver an event as is
        Event(HostEvent),
        /// Change the container's size and then deliver a resize notification
        ResizeTo(Size),
    }

    /// A copy of what was presented for a single frame.
    struct Presented {
        size: Size,
        pixels: Vec<Pixel>,
    }

    impl Presented {
        fn visible_pixels(&self) -> usize {
            self.pixels.iter().filter(|pixel| pixel.alpha > 0.0).count()
        }
    }

    struct ScriptedHost {
        size: Size,
        steps: VecDeque<Step>,
        presented: Vec<Presented>,
    }

    impl ScriptedHost {
        fn new(size: Size, steps: impl IntoIterator<Item = Step>) -> Self {
            Self {
                size,
                steps: steps.into_iter().collect(),
                presented: Vec::new(),
            }
        }

        fn frames(count: usize) -> impl Iterator<Item = Step> {
            (0..count).map(|_| Step::Event(HostEvent::Frame))
        }
    }

    impl Host for ScriptedHost {
        type Error = AnimatorError;

        fn container_size(&mut self) -> Result<Size, Self::Error> {
            Ok(self.size)
        }

        async fn next_event(&mut self) -> Result<HostEvent, Self::Error> {
            let event = match self.steps.pop_front() {
                Some(Step::Event(event)) => event,
                Some(Step::ResizeTo(size)) => {
                    tracing::debug!("Scripted resize to {size:?}");
                    self.size = size;
                    HostEvent::Resize
                }
                None => HostEvent::Teardown,
            };
            Ok(event)
        }

        fn present(&mut self, canvas: &Canvas) -> Result<(), Self::Error> {
            self.presented.push(Presented {
                size: canvas.size(),
                pixels: canvas.rows().flatten().copied().collect(),
            });
            Ok(())
        }
    }

    fn seeded(seed: u64) -> Animator {
        Animator::seeded(AnimatorConfig::default(), seed).unwrap()
    }

    #[tokio::test]
    async fn particle_count_never_changes() {
        let mut host = ScriptedHost::new(Size::new(120, 80), ScriptedHost::frames(2_000));
        let mut animator = seeded(11);
        particle_animator::host::run(&mut animator, &mut host)
            .await
            .unwrap();

        assert_eq!(animator.frame_count(), 2_000);
        assert_eq!(animator.particles().len(), 30);
        for particle in animator.particles() {
            assert!(particle.y - particle.radius <= 80.0 + particle.speed);
        }
    }

    #[tokio::test]
    async fn every_particle_eventually_falls_through_and_comes_back() {
        let mut host = ScriptedHost::new(Size::new(100, 60), ScriptedHost::frames(0));
        let mut animator = seeded(5);
        particle_animator::host::run(&mut animator, &mut host)
            .await
            .unwrap();

        let mut has_respawned = [false; 30];
        for _ in 0..200 {
            let before: Vec<f32> = animator.particles().iter().map(|p| p.y).collect();
            animator.tick();
            for (index, particle) in animator.particles().iter().enumerate() {
                if particle.y < before[index] {
                    assert!((particle.y - -20.0).abs() < f32::EPSILON);
                    has_respawned[index] = true;
                }
            }
        }

        // The slowest possible particle falls 200 pixels in 200 ticks, which is further than
        // the 60 pixel surface plus the largest possible radius.
        assert!(has_respawned.iter().all(|respawned| *respawned));
    }

    #[tokio::test]
    async fn resizing_mid_animation_keeps_the_particles() {
        let steps = ScriptedHost::frames(3)
            .chain([Step::ResizeTo(Size::new(200, 150))])
            .chain(ScriptedHost::frames(1));
        let mut host = ScriptedHost::new(Size::new(100, 100), steps);
        let mut animator = seeded(3);
        particle_animator::host::run(&mut animator, &mut host)
            .await
            .unwrap();

        let sizes: Vec<Size> = host.presented.iter().map(|frame| frame.size).collect();
        assert_eq!(
            sizes,
            vec![
                Size::new(100, 100),
                Size::new(100, 100),
                Size::new(100, 100),
                Size::new(200, 150),
            ]
        );
        assert_eq!(host.presented[3].pixels.len(), 200 * 150);
        assert_eq!(animator.particles().len(), 30);
    }

    #[tokio::test]
    async fn zero_sized_container_draws_nothing_until_it_has_a_size() {
        let steps = ScriptedHost::frames(5)
            .chain([Step::ResizeTo(Size::new(50, 100))])
            .chain(ScriptedHost::frames(1));
        let mut host = ScriptedHost::new(Size::new(0, 0), steps);
        let mut animator = seeded(8);
        particle_animator::host::run(&mut animator, &mut host)
            .await
            .unwrap();

        for frame in &host.presented[..5] {
            assert!(frame.pixels.is_empty());
        }
        assert_eq!(animator.particles().len(), 30);
        // At the very least the reference line is drawn.
        assert!(host.presented[5].visible_pixels() >= 50 * 2);
    }

    #[tokio::test]
    async fn reconfiguring_mid_animation_respawns_everything() {
        let mut config = AnimatorConfig::default();
        config.particle_count = 4;
        let steps = ScriptedHost::frames(2)
            .chain([Step::Event(HostEvent::Reconfigure(config))])
            .chain(ScriptedHost::frames(2));
        let mut host = ScriptedHost::new(Size::new(300, 200), steps);
        let mut animator = seeded(21);
        particle_animator::host::run(&mut animator, &mut host)
            .await
            .unwrap();

        assert_eq!(animator.particles().len(), 4);
        assert_eq!(animator.config().particle_count, 4);
        assert_eq!(animator.frame_count(), 4);
    }

    #[tokio::test]
    async fn the_same_seed_gives_the_same_animation() {
        let mut first_host = ScriptedHost::new(Size::new(64, 64), ScriptedHost::frames(30));
        let mut second_host = ScriptedHost::new(Size::new(64, 64), ScriptedHost::frames(30));

        let rng = rand::rngs::StdRng::seed_from_u64(99);
        let mut first = Animator::new(AnimatorConfig::default(), rng.clone()).unwrap();
        let mut second = Animator::new(AnimatorConfig::default(), rng).unwrap();
        particle_animator::host::run(&mut first, &mut first_host)
            .await
            .unwrap();
        particle_animator::host::run(&mut second, &mut second_host)
            .await
            .unwrap();

        assert_eq!(first.particles(), second.particles());
        let last = first_host.presented.len() - 1;
        assert_eq!(
            first_host.presented[last].pixels,
            second_host.presented[last].pixels
        );
    }

    #[tokio::test]
    async fn disabling_the_reference_line_leaves_an_empty_surface_without_particles() {
        let mut config = AnimatorConfig::default();
        config.particle_count = 0;
        config.reference_line.enabled = false;
        let mut host = ScriptedHost::new(Size::new(40, 100), ScriptedHost::frames(1));
        let mut animator = Animator::seeded(config, 1).unwrap();
        particle_animator::host::run(&mut animator, &mut host)
            .await
            .unwrap();

        assert_eq!(host.presented[0].visible_pixels(), 0);
    }
}
