use super::*;
use crate::pool::{HeapPool, HeapPoolOpts, PoolStats};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

fn heap() -> Arc<dyn Pool> {
    Arc::new(HeapPool::default())
}

#[derive(Debug)]
struct FakeTexture {
    bytes: usize,
}

impl crate::backend::HardwareStorage for FakeTexture {
    fn byte_len(&self) -> usize {
        self.bytes
    }
}

#[derive(Debug, Default)]
struct FakeGpuPool {
    live: AtomicUsize,
}

impl Pool for FakeGpuPool {
    fn backend(&self) -> Backend {
        Backend::Hardware
    }

    fn allocate(&self, format: BufferFormat, w: u32, h: u32) -> PigmentResult<BackendData> {
        self.live.fetch_add(1, Ordering::SeqCst);
        let bytes = format.row_bytes(w).unwrap() * h as usize;
        Ok(BackendData::Hardware(Box::new(FakeTexture { bytes })))
    }

    fn release(&self, _data: BackendData) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            outstanding: self.live.load(Ordering::SeqCst),
            ..PoolStats::default()
        }
    }
}

#[test]
fn create_then_drop_leaves_pool_balanced() {
    let pool = heap();
    let before = pool.stats().outstanding;
    for format in BufferFormat::ALL {
        let b = Buffer::new(format, 7, 3, &pool).unwrap();
        assert_eq!(b.ref_count(), 1);
        assert_eq!(pool.stats().outstanding, before + 1);
        drop(b);
        assert_eq!(pool.stats().outstanding, before);
    }
    assert_eq!(pool.stats().outstanding_bytes, 0);
}

#[test]
fn clone_and_drop_round_trip_ref_count() {
    let pool = heap();
    let b = Buffer::new(BufferFormat::Argb8888Pre, 2, 2, &pool).unwrap();
    let extra = b.clone();
    assert_eq!(b.ref_count(), 2);
    assert!(extra.ptr_eq(&b));
    drop(extra);
    assert_eq!(b.ref_count(), 1);
    assert_eq!(pool.stats().outstanding, 1);
    assert_eq!(b.width(), 2);
}

#[test]
fn zero_extent_is_rejected_before_allocation() {
    let pool = heap();
    let err = Buffer::new(BufferFormat::Rgb888, 4, 0, &pool).unwrap_err();
    assert!(matches!(err, PigmentError::InvalidFormat(_)));
    assert_eq!(pool.stats().allocations, 0);
}

#[test]
fn allocation_failure_propagates() {
    let pool: Arc<dyn Pool> = Arc::new(HeapPool::new(HeapPoolOpts {
        max_bytes: Some(8),
        ..HeapPoolOpts::default()
    }));
    let err = Buffer::new(BufferFormat::Argb8888Pre, 4, 4, &pool).unwrap_err();
    assert!(matches!(err, PigmentError::AllocationFailure(_)));
}

#[test]
fn external_storage_goes_back_to_release_hook() {
    let returned: Arc<Mutex<Option<SoftwareData>>> = Arc::default();
    let sink = Arc::clone(&returned);
    let b = Buffer::from_external_with_release(
        BufferFormat::Rgb888,
        2,
        1,
        SoftwareData::packed(vec![1, 2, 3, 4, 5, 6], 6),
        move |data| *sink.lock().unwrap() = Some(data),
    )
    .unwrap();
    assert!(b.is_external());
    assert!(b.pool().is_none());
    drop(b);

    let data = returned.lock().unwrap().take().unwrap();
    assert_eq!(data.planes()[0].bytes(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn external_storage_must_fit_format() {
    let err = Buffer::from_external(
        BufferFormat::Argb8888Pre,
        2,
        2,
        SoftwareData::packed(vec![0; 12], 8),
    )
    .unwrap_err();
    assert!(matches!(err, PigmentError::InvalidFormat(_)));
}

#[test]
fn content_hash_ignores_row_padding() {
    let tight = heap();
    let padded: Arc<dyn Pool> = Arc::new(HeapPool::new(HeapPoolOpts {
        row_alignment: 32,
        ..HeapPoolOpts::default()
    }));
    let a = Buffer::new(BufferFormat::Rgb888, 3, 2, &tight).unwrap();
    let b = Buffer::new(BufferFormat::Rgb888, 3, 2, &padded).unwrap();
    assert_eq!(b.query().unwrap().strides.as_slice(), &[32]);

    for buf in [&a, &b] {
        let mut w = buf.write();
        let mut img = w.image_mut().unwrap();
        img.row_mut(0, 1).copy_from_slice(&[9, 8, 7, 6, 5, 4, 3, 2, 1]);
    }
    assert_eq!(a.content_hash().unwrap(), b.content_hash().unwrap());

    b.write().image_mut().unwrap().row_mut(0, 0)[0] = 1;
    assert_ne!(a.content_hash().unwrap(), b.content_hash().unwrap());
}

#[test]
fn user_data_is_typed_and_replaceable() {
    let b = Buffer::new(BufferFormat::A8, 1, 1, &heap()).unwrap();
    assert!(b.user_data::<String>().is_none());
    b.set_user_data(Some(Arc::new(String::from("decoded.png"))));
    assert_eq!(b.user_data::<String>().unwrap().as_str(), "decoded.png");
    assert!(b.user_data::<u32>().is_none());
    b.set_user_data(None);
    assert!(b.user_data::<String>().is_none());
}

#[test]
fn hardware_storage_is_released_to_its_pool_but_not_mappable() {
    let gpu = Arc::new(FakeGpuPool::default());
    let pool: Arc<dyn Pool> = gpu.clone();
    let b = Buffer::new(BufferFormat::Argb8888Pre, 4, 4, &pool).unwrap();
    assert_eq!(b.backend(), Backend::Hardware);
    assert!(!b.query().unwrap().mappable);
    assert!(matches!(
        b.read().image().unwrap_err(),
        PigmentError::InvalidArgument(_)
    ));
    assert_eq!(b.read().data().byte_len(), 64);
    drop(b);
    assert_eq!(gpu.live.load(Ordering::SeqCst), 0);
}
