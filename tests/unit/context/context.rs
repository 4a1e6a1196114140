use super::*;
use crate::backend::{BackendData, HardwareStorage};
use crate::convert::Converter;
use crate::pool::PoolStats;

#[derive(Debug)]
struct Texture;

impl HardwareStorage for Texture {
    fn byte_len(&self) -> usize {
        0
    }
}

#[derive(Debug)]
struct TexturePool {
    backend: Backend,
}

impl Pool for TexturePool {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn allocate(&self, _: BufferFormat, _: u32, _: u32) -> PigmentResult<BackendData> {
        Ok(BackendData::Hardware(Box::new(Texture)))
    }

    fn release(&self, _: BackendData) {}

    fn stats(&self) -> PoolStats {
        PoolStats::default()
    }
}

fn swap_rb(_: &crate::buffer::view::ImageRef<'_>, _: &mut crate::buffer::view::ImageMut<'_>) {}

#[derive(Debug)]
struct GpuBackend {
    claims: Backend,
}

impl BackendProvider for GpuBackend {
    fn backend(&self) -> Backend {
        Backend::Hardware
    }

    fn create_pool(&self, _: &ContextOpts) -> PigmentResult<Arc<dyn Pool>> {
        Ok(Arc::new(TexturePool {
            backend: self.claims,
        }))
    }

    fn register_converters(&self, registry: &mut ConverterRegistry, _: &ContextOpts) {
        registry
            .register(
                Converter::Image(swap_rb),
                BufferFormat::Rgb888,
                Angle::None,
                BufferFormat::Bgr888,
            )
            .unwrap();
    }
}

#[test]
fn default_context_has_software_pool_and_converters() {
    let ctx = Context::new(ContextOpts::default()).unwrap();
    assert_eq!(ctx.pool().unwrap().backend(), Backend::Software);
    assert!(ctx.registry().contains(
        BufferFormat::Rgb888,
        Angle::Cw90,
        BufferFormat::Argb8888Pre
    ));
    let err = ctx.pool_for(Backend::Hardware).unwrap_err();
    assert!(matches!(err, PigmentError::NotFound(_)));
}

#[test]
fn converters_can_be_left_out() {
    let opts = ContextOpts {
        software_converters: false,
        ..ContextOpts::default()
    };
    let ctx = Context::new(opts).unwrap();
    assert!(ctx.registry().is_empty());
}

#[test]
fn options_parse_from_json() {
    let json = serde_json::json!({
        "pool": { "kind": "recycling", "max_per_bucket": 2 }
    })
    .to_string();
    let opts = ContextOpts::from_json(&json).unwrap();
    assert_eq!(
        opts.pool,
        PoolKind::Recycling(RecyclingPoolOpts {
            max_per_bucket: 2,
            ..RecyclingPoolOpts::default()
        })
    );
    assert!(opts.software_converters);

    let back = ContextOpts::from_json(&opts.to_json().unwrap()).unwrap();
    assert_eq!(back, opts);
}

#[test]
fn empty_json_gives_defaults() {
    assert_eq!(ContextOpts::from_json("{}").unwrap(), ContextOpts::default());
}

#[test]
fn malformed_json_is_wrapped() {
    let err = ContextOpts::from_json(r#"{"pool": {"kind": "gpu"}}"#).unwrap_err();
    assert!(matches!(err, PigmentError::Other(_)));
    assert!(err.to_string().contains("parse context options JSON"));
}

#[test]
fn recycling_context_reuses_storage() {
    let opts = ContextOpts {
        pool: PoolKind::Recycling(RecyclingPoolOpts::default()),
        ..ContextOpts::default()
    };
    let ctx = Context::new(opts).unwrap();
    drop(ctx.surface(SurfaceFormat::Argb8888, 8, 8).unwrap());
    let stats = ctx.pool().unwrap().stats();
    assert_eq!(stats.outstanding, 0);
    assert_eq!(stats.retained, 1);

    let _again = ctx.buffer(BufferFormat::Argb8888Pre, 8, 8).unwrap();
    assert_eq!(ctx.pool().unwrap().stats().retained, 0);
}

#[test]
fn extra_provider_adds_pool_and_converters() {
    let gpu = GpuBackend {
        claims: Backend::Hardware,
    };
    let ctx = Context::with_providers(ContextOpts::default(), &[&SoftwareBackend, &gpu]).unwrap();
    assert_eq!(ctx.pool_for(Backend::Hardware).unwrap().backend(), Backend::Hardware);
    assert!(ctx.registry().contains(BufferFormat::Rgb888, Angle::None, BufferFormat::Bgr888));
    assert!(ctx.registry().contains(
        BufferFormat::Argb8888,
        Angle::None,
        BufferFormat::Argb8888Pre
    ));
}

#[test]
fn provider_with_mismatched_pool_is_rejected() {
    let liar = GpuBackend {
        claims: Backend::Software,
    };
    let err = Context::with_providers(ContextOpts::default(), &[&liar]).unwrap_err();
    assert!(matches!(err, PigmentError::InvalidArgument(_)));
}

#[test]
fn convert_to_allocates_rotated_destination() {
    let ctx = Context::new(ContextOpts::default()).unwrap();
    let src = ctx.buffer(BufferFormat::Rgb888, 3, 2).unwrap();
    let dst = ctx
        .convert_to(&src, BufferFormat::Argb8888Pre, Angle::Cw90)
        .unwrap();
    assert_eq!((dst.width(), dst.height()), (2, 3));
    assert_eq!(dst.format(), BufferFormat::Argb8888Pre);
}

#[test]
fn registry_mut_accepts_extra_routines() {
    let mut ctx = Context::new(ContextOpts::default()).unwrap();
    let mut register = || {
        ctx.registry_mut()
            .register(
                Converter::Image(swap_rb),
                BufferFormat::Rgb888,
                Angle::None,
                BufferFormat::Bgr888,
            )
            .unwrap()
    };
    assert!(register().is_none());
    assert!(register().is_some());
}
