#[cfg(test)]
mod marker_rendering_tests {
    use mapstamp::prelude::*;
    use mapstamp::rendering::context::{identity, rotation_about};
    use std::f64::consts::FRAC_PI_4;

    /// Anchor provider standing in for a geometry painter
    struct StubPainter {
        anchors: Vec<AnchorPoint>,
        hit_testing: bool,
        spriting: bool,
        invalidated: bool,
        requested_placement: Option<MarkerPlacement>,
    }

    impl StubPainter {
        fn with_anchors(anchors: Vec<AnchorPoint>) -> Self {
            Self {
                anchors,
                hit_testing: false,
                spriting: false,
                invalidated: false,
                requested_placement: None,
            }
        }

        fn at_origin() -> Self {
            Self::with_anchors(vec![AnchorPoint::new(Point::new(0.0, 0.0))])
        }
    }

    impl MarkerPainter for StubPainter {
        fn render_points(&mut self, placement: MarkerPlacement) -> Vec<AnchorPoint> {
            self.requested_placement = Some(placement);
            self.anchors.clone()
        }

        fn is_hit_testing(&self) -> bool {
            self.hit_testing
        }

        fn is_spriting(&self) -> bool {
            self.spriting
        }

        fn invalidate_cache(&mut self) {
            self.invalidated = true;
        }
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn solid_raster(width: u32, height: u32, rgba: [u8; 4]) -> Raster {
        let mut raster = Raster::new(width, height);
        for pixel in raster.data_mut().chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
        raster
    }

    /// Cache holding one raster under the key a fixed-size symbol asks for
    fn sized_cache(source: &str, width: u32, height: u32) -> ResourceCache {
        let mut cache = ResourceCache::new();
        cache.insert(
            ResourceKey::new(source.to_string(), Some(width), Some(height)),
            solid_raster(width, height, [200, 100, 50, 255]),
        );
        cache
    }

    /// Cache holding one raster under its natural-size key only
    fn natural_cache(source: &str, raster: Raster) -> ResourceCache {
        let mut cache = ResourceCache::new();
        cache.insert(ResourceKey::new(source.to_string(), None, None), raster);
        cache
    }

    fn command(ctx: &RenderContext, index: usize) -> (&Raster, Bounds, [f64; 6], f64) {
        let DrawCommand::Image {
            image,
            dest,
            transform,
            alpha,
        } = &ctx.drawing_queue()[index];
        (image, dest.clone(), *transform, *alpha)
    }

    #[test]
    fn test_marker_draws_at_each_anchor() {
        init_logger();
        let mut symbolizer =
            ImageMarkerSymbolizer::new(MarkerSymbol::new("pin.png").with_size(8.0, 8.0));
        let mut painter = StubPainter::with_anchors(vec![
            AnchorPoint::new(Point::new(100.0, 50.0)),
            AnchorPoint::new(Point::new(-20.0, 0.0)),
        ]);
        let mut cache = sized_cache("pin.png", 8, 8);
        let mut ctx = RenderContext::new(256, 256);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        assert_eq!(ctx.drawing_queue().len(), 2);
        // Default alignment is middle/top: centered horizontally, hanging down.
        let (_, dest, transform, alpha) = command(&ctx, 0);
        assert_eq!(dest, Bounds::from_coords(96.0, 50.0, 104.0, 58.0));
        assert_eq!(transform, identity());
        assert_eq!(alpha, 1.0);
        let (_, dest, _, _) = command(&ctx, 1);
        assert_eq!(dest, Bounds::from_coords(-24.0, 0.0, -16.0, 8.0));
    }

    #[test]
    fn test_alignment_moves_the_marker_box() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png")
                .with_size(8.0, 8.0)
                .with_alignment(HorizontalAlignment::Left, VerticalAlignment::Bottom),
        );
        let mut painter = StubPainter::with_anchors(vec![AnchorPoint::new(Point::new(50.0, 50.0))]);
        let mut cache = sized_cache("pin.png", 8, 8);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        // Left/bottom: the box starts at the anchor and rises above it.
        let (_, dest, _, _) = command(&ctx, 0);
        assert_eq!(dest, Bounds::from_coords(50.0, 42.0, 58.0, 50.0));
    }

    #[test]
    fn test_invisible_markers_are_skipped() {
        init_logger();
        let invisible = [
            MarkerSymbol::new("pin.png").with_size(0.0, 8.0),
            MarkerSymbol::new("pin.png").with_size(8.0, 0.0),
            MarkerSymbol::new("pin.png").with_size(8.0, 8.0).with_opacity(0.0),
        ];

        for symbol in invisible {
            let mut symbolizer = ImageMarkerSymbolizer::new(symbol);
            let mut painter = StubPainter::at_origin();
            let mut cache = sized_cache("pin.png", 8, 8);
            let mut ctx = RenderContext::new(64, 64);

            symbolizer
                .symbolize(&mut ctx, &mut painter, &mut cache)
                .unwrap();
            assert!(
                ctx.drawing_queue().is_empty(),
                "invisible marker should not draw"
            );
        }
    }

    #[test]
    fn test_hit_testing_draws_invisible_markers() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png").with_size(8.0, 8.0).with_opacity(0.0),
        );
        let mut painter = StubPainter::at_origin();
        painter.hit_testing = true;
        let mut cache = sized_cache("pin.png", 8, 8);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        assert_eq!(
            ctx.drawing_queue().len(),
            1,
            "hit-testing probes invisible markers too"
        );
    }

    #[test]
    fn test_missing_resource_skips_quietly() {
        init_logger();
        let mut symbolizer =
            ImageMarkerSymbolizer::new(MarkerSymbol::new("absent.png").with_size(8.0, 8.0));
        let mut painter = StubPainter::at_origin();
        let mut cache = ResourceCache::new();
        let mut ctx = RenderContext::new(64, 64);

        let result = symbolizer.symbolize(&mut ctx, &mut painter, &mut cache);

        assert!(result.is_ok(), "missing resources are not an error");
        assert!(ctx.drawing_queue().is_empty());
    }

    #[test]
    fn test_no_anchors_short_circuits() {
        init_logger();
        let mut symbolizer =
            ImageMarkerSymbolizer::new(MarkerSymbol::new("pin.png").with_size(8.0, 8.0));
        let mut painter = StubPainter::with_anchors(Vec::new());
        let mut cache = sized_cache("pin.png", 8, 8);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();
        assert!(ctx.drawing_queue().is_empty());
    }

    #[test]
    fn test_painter_receives_symbol_placement() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png")
                .with_size(8.0, 8.0)
                .with_placement(MarkerPlacement::VertexLast),
        );
        let mut painter = StubPainter::at_origin();
        let mut cache = sized_cache("pin.png", 8, 8);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();
        assert_eq!(
            painter.requested_placement,
            Some(MarkerPlacement::VertexLast)
        );
    }

    #[test]
    fn test_natural_size_backfill_happens_once() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(MarkerSymbol::new("pin.png"));
        let mut painter = StubPainter::at_origin();
        let mut cache = natural_cache("pin.png", solid_raster(4, 6, [1, 2, 3, 255]));
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        // Style adopted the natural size and the sized binding now exists,
        // aliasing the very same raster.
        assert_eq!(symbolizer.style().width, Some(4.0));
        assert_eq!(symbolizer.style().height, Some(6.0));
        assert!(painter.invalidated);
        let natural = cache
            .get_image(&ResourceKey::new("pin.png".to_string(), None, None))
            .unwrap();
        let sized = cache
            .get_image(&ResourceKey::new("pin.png".to_string(), Some(4), Some(6)))
            .unwrap();
        assert!(Arc::ptr_eq(&natural, &sized));

        let (_, dest, _, _) = command(&ctx, 0);
        assert_eq!(dest, Bounds::from_coords(-2.0, 0.0, 2.0, 6.0));

        // A second pass finds the size already resolved.
        painter.invalidated = false;
        let before = cache.len();
        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();
        assert!(!painter.invalidated, "backfill must not repeat");
        assert_eq!(cache.len(), before);
    }

    #[test]
    fn test_spriting_defers_cache_invalidation() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(MarkerSymbol::new("pin.png"));
        let mut painter = StubPainter::at_origin();
        painter.spriting = true;
        let mut cache = natural_cache("pin.png", solid_raster(4, 4, [9, 9, 9, 255]));
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        assert!(!painter.invalidated, "spriting batches defer invalidation");
        assert!(
            cache.is_resource_loaded(&ResourceKey::new("pin.png".to_string(), Some(4), Some(4))),
            "the sized binding is still registered"
        );
    }

    #[test]
    fn test_recolor_tints_a_copy_not_the_cache() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png")
                .with_size(2.0, 2.0)
                .with_replace_color(ColorSpec::Text("#ff0000".to_string())),
        );
        let mut painter = StubPainter::at_origin();
        let mut cache = sized_cache("pin.png", 2, 2);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        // Red tint keeps R, zeroes G and B, leaves alpha alone.
        let (image, _, _, alpha) = command(&ctx, 0);
        assert_eq!(&image.data()[..4], &[200, 0, 0, 255]);
        assert_eq!(alpha, 1.0);

        let cached = cache
            .get_image(&ResourceKey::new("pin.png".to_string(), Some(2), Some(2)))
            .unwrap();
        assert_eq!(&cached.data()[..4], &[200, 100, 50, 255], "cache untouched");
    }

    #[test]
    fn test_recolor_alpha_overrides_style_opacity() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png")
                .with_size(2.0, 2.0)
                .with_opacity(0.9)
                .with_replace_color(ColorSpec::Channels(vec![255.0, 255.0, 255.0, 0.5])),
        );
        let mut painter = StubPainter::at_origin();
        let mut cache = sized_cache("pin.png", 2, 2);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        let (_, _, _, alpha) = command(&ctx, 0);
        assert_eq!(alpha, 0.5, "the color's own alpha wins over opacity");
        assert_eq!(ctx.global_alpha(), 1.0, "alpha restored after the symbol");
    }

    #[test]
    fn test_unparsable_recolor_draws_untinted() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png")
                .with_size(2.0, 2.0)
                .with_replace_color(ColorSpec::Text("definitely-not-a-color".to_string())),
        );
        let mut painter = StubPainter::at_origin();
        let mut cache = sized_cache("pin.png", 2, 2);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        let (image, _, _, _) = command(&ctx, 0);
        assert_eq!(&image.data()[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn test_opacity_multiplies_surface_alpha() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png").with_size(2.0, 2.0).with_opacity(0.5),
        );
        let mut painter = StubPainter::at_origin();
        let mut cache = sized_cache("pin.png", 2, 2);
        let mut ctx = RenderContext::new(64, 64);
        ctx.set_global_alpha(0.8);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        let (_, _, _, alpha) = command(&ctx, 0);
        assert!((alpha - 0.4).abs() < 1e-12);
        assert_eq!(ctx.global_alpha(), 0.8, "surface alpha restored");
    }

    #[test]
    fn test_vector_path_kind_keeps_surface_alpha() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("shape.svg")
                .with_kind(MarkerKind::VectorPath)
                .with_size(2.0, 2.0)
                .with_opacity(0.5),
        );
        let mut painter = StubPainter::at_origin();
        let mut cache = sized_cache("shape.svg", 2, 2);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        // Path sources already carry their opacity; drawing at full alpha.
        let (_, _, _, alpha) = command(&ctx, 0);
        assert_eq!(alpha, 1.0);
    }

    #[test]
    fn test_rotation_is_scoped_per_anchor() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png").with_size(8.0, 8.0).with_rotation(90.0),
        );
        let first = Point::new(10.0, 10.0);
        let second = Point::new(40.0, -5.0);
        let mut painter =
            StubPainter::with_anchors(vec![AnchorPoint::new(first), AnchorPoint::new(second)]);
        let mut cache = sized_cache("pin.png", 8, 8);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        let angle = -(90.0_f64.to_radians());
        let (_, _, transform, _) = command(&ctx, 0);
        assert_eq!(transform, rotation_about(angle, first));
        let (_, dest, transform, _) = command(&ctx, 1);
        assert_eq!(transform, rotation_about(angle, second));
        assert_eq!(dest, Bounds::from_coords(36.0, -5.0, 44.0, 3.0));

        assert_eq!(
            *ctx.transform(),
            identity(),
            "rotation must not leak out of the symbol"
        );
    }

    #[test]
    fn test_anchor_rotation_combines_with_symbol_rotation() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png").with_size(8.0, 8.0).with_rotation(90.0),
        );
        let anchor = Point::new(5.0, 5.0);
        let mut painter =
            StubPainter::with_anchors(vec![AnchorPoint::new(anchor).with_rotation(FRAC_PI_4)]);
        let mut cache = sized_cache("pin.png", 8, 8);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        let angle = -(90.0_f64.to_radians()) + FRAC_PI_4;
        let (_, _, transform, _) = command(&ctx, 0);
        assert_eq!(transform, rotation_about(angle, anchor));
    }

    #[test]
    fn test_draw_error_restores_surface_state() {
        init_logger();
        let mut symbolizer = ImageMarkerSymbolizer::new(
            MarkerSymbol::new("pin.png")
                .with_size(8.0, 8.0)
                .with_opacity(0.5)
                .with_rotation(45.0),
        );
        let mut painter = StubPainter::with_anchors(vec![
            AnchorPoint::new(Point::new(f64::NAN, 0.0)),
            AnchorPoint::new(Point::new(10.0, 10.0)),
        ]);
        let mut cache = sized_cache("pin.png", 8, 8);
        let mut ctx = RenderContext::new(64, 64);

        let result = symbolizer.symbolize(&mut ctx, &mut painter, &mut cache);

        assert!(result.is_err(), "surface rejects the non-finite anchor");
        assert!(ctx.drawing_queue().is_empty(), "failed draw stops the loop");
        assert_eq!(ctx.global_alpha(), 1.0, "alpha restored on the way out");
        assert_eq!(*ctx.transform(), identity(), "transform restored too");
    }

    #[test]
    fn test_symbol_from_style_sheet_json() {
        init_logger();
        let symbol = MarkerSymbol::from_json(
            r#"{
                "source": "stop.png",
                "width": 4,
                "height": 4,
                "dx": 1,
                "dy": 1,
                "replace_color": [0, 255, 0]
            }"#,
        )
        .unwrap();
        let mut symbolizer = ImageMarkerSymbolizer::new(symbol);
        let mut painter = StubPainter::at_origin();
        let mut cache = sized_cache("stop.png", 4, 4);
        let mut ctx = RenderContext::new(64, 64);

        symbolizer
            .symbolize(&mut ctx, &mut painter, &mut cache)
            .unwrap();

        let (image, dest, _, _) = command(&ctx, 0);
        assert_eq!(dest, Bounds::from_coords(-1.0, 1.0, 3.0, 5.0));
        assert_eq!(&image.data()[..4], &[0, 100, 0, 255]);
    }
}
