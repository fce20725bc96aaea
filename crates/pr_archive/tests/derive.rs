//! `#[derive(Persist)]` end to end: layouts, strategy choice and registry use.

use pr_archive::archive::{DynInputArchive, DynOutputArchive};
use pr_archive::channel::{ByteSink, ByteSource};
use pr_archive::classify::strategy_of;
use pr_archive::{
    ArchiveError, Config, InputArchive, OutputArchive, Persist, Registered, Registry,
    RegistryBuilder, Strategy, Trivial, register_external,
};

fn save_with<T: Persist>(registry: &Registry, value: &T) -> Vec<u8> {
    let mut bytes = Vec::new();
    OutputArchive::with_registry(&mut bytes, registry)
        .save(value)
        .unwrap();
    bytes
}

fn load_with<T: Persist + Default>(registry: &Registry, bytes: &[u8]) -> Result<T, ArchiveError> {
    InputArchive::with_registry(bytes, registry).load_new()
}

fn round_trip<T: Persist + Default>(value: &T) -> T {
    let bytes = save_with(Registry::empty_ref(), value);
    let mut input = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref());
    let out = input.load_new().unwrap();
    assert!(input.source().is_empty(), "input not fully consumed");
    out
}

fn ne<const N: usize>(chunks: &[[u8; N]]) -> Vec<u8> {
    chunks.concat()
}

// -----------------------------------------------------------------------------
// Field-wise structs

#[derive(Persist, Default, Debug, PartialEq)]
struct Sample {
    i: i32,
    j: i32,
    k: Vec<i32>,
}

#[test]
fn struct_fields_in_declaration_order() {
    let sample = Sample {
        i: 3,
        j: 7,
        k: vec![1, 2, 3],
    };
    let bytes = save_with(Registry::empty_ref(), &sample);

    let mut expected = ne(&[3_i32.to_ne_bytes(), 7_i32.to_ne_bytes()]);
    expected.extend_from_slice(&3_u64.to_ne_bytes());
    expected.extend(ne(&[1_i32, 2, 3].map(i32::to_ne_bytes)));
    assert_eq!(bytes, expected);

    assert_eq!(round_trip(&sample), sample);
    assert_eq!(Sample::STRATEGY, Strategy::MemberDefined);
    assert_eq!(Sample::MIN_ENCODED_LEN, 4 + 4 + 8);
}

#[derive(Persist, Default, Debug, PartialEq)]
struct Session {
    user: String,
    #[persist(skip)]
    cached_len: usize,
    visits: u16,
}

#[test]
fn skipped_fields_reset_to_default() {
    let session = Session {
        user: "ada".into(),
        cached_len: 99,
        visits: 4,
    };
    let bytes = save_with(Registry::empty_ref(), &session);
    assert_eq!(bytes.len(), 8 + 3 + 2);

    let mut target = Session {
        user: String::new(),
        cached_len: 12,
        visits: 0,
    };
    InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref())
        .load(&mut target)
        .unwrap();
    assert_eq!(
        target,
        Session {
            user: "ada".into(),
            cached_len: 0,
            visits: 4,
        }
    );
}

#[derive(Persist, Default, Debug, PartialEq)]
struct Meters(f64);

#[derive(Persist, Default, Debug, PartialEq)]
struct Marker;

#[test]
fn tuple_and_unit_structs() {
    assert_eq!(round_trip(&Meters(2.5)), Meters(2.5));
    assert_eq!(save_with(Registry::empty_ref(), &Marker), Vec::<u8>::new());
    assert_eq!(round_trip(&Marker), Marker);
}

#[derive(Persist, Default, Debug, PartialEq)]
struct Pair<T> {
    left: T,
    right: T,
}

#[test]
fn generic_structs() {
    let pair = Pair {
        left: vec![String::from("a")],
        right: vec![String::from("b"), String::from("c")],
    };
    assert_eq!(round_trip(&pair), pair);
    assert_eq!(Pair::<u8>::MIN_ENCODED_LEN, 2);
}

// -----------------------------------------------------------------------------
// Enums

#[derive(Persist, Default, Debug, PartialEq)]
enum Shape {
    #[default]
    Empty,
    Circle(f32),
    Rect {
        w: u32,
        h: u32,
    },
    Labeled {
        label: String,
        #[persist(skip)]
        hits: u32,
    },
}

#[test]
fn enums_write_the_variant_index() {
    let bytes = save_with(Registry::empty_ref(), &Shape::Rect { w: 2, h: 5 });
    assert_eq!(
        bytes,
        ne(&[2_u32.to_ne_bytes(), 2_u32.to_ne_bytes(), 5_u32.to_ne_bytes()])
    );

    for shape in [
        Shape::Empty,
        Shape::Circle(1.5),
        Shape::Rect { w: 1, h: 2 },
        Shape::Labeled {
            label: "x".into(),
            hits: 0,
        },
    ] {
        assert_eq!(round_trip(&shape), shape);
    }

    let labeled = Shape::Labeled {
        label: "y".into(),
        hits: 7,
    };
    assert_eq!(
        round_trip(&labeled),
        Shape::Labeled {
            label: "y".into(),
            hits: 0,
        }
    );
}

#[test]
fn unknown_variant_index() {
    let bytes = 9_u32.to_ne_bytes();
    let err = load_with::<Shape>(Registry::empty_ref(), &bytes).unwrap_err();
    assert!(matches!(err, ArchiveError::InvalidVariant { index: 9, .. }));
}

// -----------------------------------------------------------------------------
// Trivial-Copy

#[derive(Persist, Clone, Copy, Default, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[persist(trivial)]
#[repr(C)]
struct PackedPoint {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Persist, Clone, Copy, Default, Debug, PartialEq)]
struct FieldPoint {
    x: f32,
    y: f32,
    z: f32,
}

fn assert_trivial<T: Trivial>() {}

#[test]
fn trivial_and_field_wise_bytes_agree() {
    assert_trivial::<PackedPoint>();
    assert_eq!(strategy_of::<PackedPoint>(), Strategy::TrivialCopy);
    assert_eq!(strategy_of::<FieldPoint>(), Strategy::MemberDefined);

    let packed: Vec<PackedPoint> = (0..5)
        .map(|n| PackedPoint {
            x: n as f32,
            y: 0.5,
            z: -(n as f32),
        })
        .collect();
    let fields: Vec<FieldPoint> = packed
        .iter()
        .map(|p| FieldPoint {
            x: p.x,
            y: p.y,
            z: p.z,
        })
        .collect();

    let packed_bytes = save_with(Registry::empty_ref(), &packed);
    assert_eq!(packed_bytes, save_with(Registry::empty_ref(), &fields));
    assert_eq!(packed_bytes.len(), 8 + 5 * 12);

    let reread: Vec<FieldPoint> = load_with(Registry::empty_ref(), &packed_bytes).unwrap();
    assert_eq!(reread, fields);
    assert_eq!(round_trip(&packed), packed);
}

// -----------------------------------------------------------------------------
// Externally-Registered

#[derive(Persist, Default, Debug, PartialEq)]
#[persist(external)]
struct Image {
    width: u32,
    height: u32,
    payload_length: u32,
    payload: Vec<f32>,
}

fn save_image(image: &Image, ar: &mut DynOutputArchive<'_, '_>) -> Result<(), ArchiveError> {
    ar.save(&image.width)?;
    ar.save(&image.height)?;
    ar.save(&image.payload_length)?;
    f32::save_slice(&image.payload, ar)
}

fn load_image(image: &mut Image, ar: &mut DynInputArchive<'_, '_>) -> Result<(), ArchiveError> {
    ar.load(&mut image.width)?;
    ar.load(&mut image.height)?;
    ar.load(&mut image.payload_length)?;
    image.payload.clear();
    image.payload.resize(image.payload_length as usize, 0.0);
    f32::load_slice(&mut image.payload, ar)
}

fn image_registry() -> Registry {
    let mut builder = RegistryBuilder::new();
    builder.register::<Image>(save_image, load_image).unwrap();
    builder.build()
}

#[test]
fn registered_functions_write_the_bytes() {
    let registry = image_registry();
    let image = Image {
        width: 2,
        height: 2,
        payload_length: 4,
        payload: vec![1.0, 2.0, 3.0, 4.0],
    };
    assert_eq!(Image::STRATEGY, Strategy::ExternallyRegistered);

    let bytes = save_with(&registry, &image);
    let mut expected = ne(&[2_u32, 2, 4].map(u32::to_ne_bytes));
    expected.extend(ne(&[1.0_f32, 2.0, 3.0, 4.0].map(f32::to_ne_bytes)));
    assert_eq!(bytes, expected);

    let reread: Image = load_with(&registry, &bytes).unwrap();
    assert_eq!(reread, image);
}

#[test]
fn missing_registration_is_an_error() {
    let mut bytes = Vec::new();
    let err = OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
        .save(&Image::default())
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Unregistered { .. }));
    assert!(bytes.is_empty());

    let err = load_with::<Image>(Registry::empty_ref(), &[0; 12]).unwrap_err();
    assert!(matches!(err, ArchiveError::Unregistered { .. }));
}

#[derive(Persist, Default, Debug, PartialEq)]
struct Scene {
    name: String,
    layers: Vec<Image>,
}

#[test]
fn registered_types_nest_inside_derived_ones() {
    let registry = image_registry();
    let scene = Scene {
        name: "sky".into(),
        layers: vec![
            Image {
                width: 1,
                height: 1,
                payload_length: 1,
                payload: vec![0.25],
            },
            Image::default(),
        ],
    };
    let bytes = save_with(&registry, &scene);
    let reread: Scene = load_with(&registry, &bytes).unwrap();
    assert_eq!(reread, scene);
}

#[test]
fn runs_of_registered_values() {
    let registry = image_registry();
    let layers: Vec<Image> = (1..=3)
        .map(|n| Image {
            width: n,
            height: n,
            payload_length: 1,
            payload: vec![n as f32],
        })
        .collect();
    let bytes = save_with(&registry, &layers);
    assert_eq!(bytes.len(), 8 + 3 * 16);
    assert_eq!(load_with::<Vec<Image>>(&registry, &bytes).unwrap(), layers);

    // An empty run never looks the codec up.
    let empty = save_with(Registry::empty_ref(), &Vec::<Image>::new());
    assert!(load_with::<Vec<Image>>(Registry::empty_ref(), &empty).unwrap().is_empty());

    let err = load_with::<Vec<Image>>(Registry::empty_ref(), &bytes).unwrap_err();
    assert!(matches!(err, ArchiveError::Unregistered { .. }));
}

// -----------------------------------------------------------------------------
// Priority

fn save_celsius<W: ByteSink>(c: &Celsius, ar: &mut OutputArchive<'_, W>) -> Result<(), ArchiveError> {
    ar.save(&((c.0 * 100.0) as i32))
}

fn load_celsius<R: ByteSource>(
    c: &mut Celsius,
    ar: &mut InputArchive<'_, R>,
) -> Result<(), ArchiveError> {
    let mut centi = 0_i32;
    ar.load(&mut centi)?;
    c.0 = centi as f32 / 100.0;
    Ok(())
}

#[derive(Persist, Clone, Copy, Default, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[persist(trivial, external, save = save_celsius, load = load_celsius)]
#[repr(C)]
struct Celsius(f32);

#[derive(Persist, Clone, Copy, Default, Debug, PartialEq)]
#[persist(trivial, external)]
struct Opaque(u64);

#[test]
fn highest_priority_candidate_wins() {
    assert_eq!(Celsius::STRATEGY, Strategy::MemberDefined);
    assert_eq!(
        save_with(Registry::empty_ref(), &Celsius(21.5)),
        2150_i32.to_ne_bytes()
    );
    assert_eq!(round_trip(&Celsius(21.5)), Celsius(21.5));

    assert_eq!(Opaque::STRATEGY, Strategy::ExternallyRegistered);
    let mut bytes = Vec::new();
    let err = OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
        .save(&Opaque(1))
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Unregistered { .. }));

    assert_eq!(strategy_of::<Vec<Opaque>>(), Strategy::ContainerRecursive);
    assert_eq!(strategy_of::<[PackedPoint; 3]>(), Strategy::TrivialCopy);
}

// -----------------------------------------------------------------------------
// Static registration

#[derive(Default, Debug, PartialEq)]
struct ForeignId(u128);

fn save_foreign(id: &ForeignId, ar: &mut DynOutputArchive<'_, '_>) -> Result<(), ArchiveError> {
    ar.save(&id.0)
}

fn load_foreign(id: &mut ForeignId, ar: &mut DynInputArchive<'_, '_>) -> Result<(), ArchiveError> {
    ar.load(&mut id.0)
}

register_external!(ForeignId, save_foreign, load_foreign);

#[test]
fn statically_registered_codecs_reach_the_global_registry() {
    assert!(Registry::global().contains::<ForeignId>());

    let value = Registered(ForeignId(0xDEAD_BEEF));
    let mut bytes = Vec::new();
    OutputArchive::new(&mut bytes).save(&value).unwrap();
    assert_eq!(bytes, 0xDEAD_BEEF_u128.to_ne_bytes());

    let mut input = InputArchive::new(bytes.as_slice());
    let reread: Registered<ForeignId> = input.load_new().unwrap();
    assert_eq!(reread.into_inner(), ForeignId(0xDEAD_BEEF));
}

// -----------------------------------------------------------------------------
// Checked mode

#[test]
fn checked_mode_rejects_another_type() {
    let mut bytes = Vec::new();
    OutputArchive::with_registry(&mut bytes, Registry::empty_ref())
        .with_config(Config::DEFAULT.checked())
        .save(&FieldPoint {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        })
        .unwrap();

    let mut input = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref())
        .with_config(Config::DEFAULT.checked());
    let err = input.load_new::<PackedPoint>().unwrap_err();
    assert!(matches!(err, ArchiveError::TypeMismatch { .. }));

    let mut input = InputArchive::with_registry(bytes.as_slice(), Registry::empty_ref())
        .with_config(Config::DEFAULT.checked());
    let point: FieldPoint = input.load_new().unwrap();
    assert_eq!(point.z, 3.0);
}
