//! Loading scenes from JSON descriptions
//!
//! A scene file has five sections:
//!
//! ```json
//! {
//!   "film":   { "width": 400, "height": 300, "samples": 64, "output": "out.png" },
//!   "camera": { "position": [0, 1, 5], "look_at": [0, 0, 0], "up": [0, 1, 0],
//!               "fov": 40.0, "aperture": 0.0, "background": [0.7, 0.8, 1.0] },
//!   "textures":  [ { "name": "floor", "type": "checkered", "even": [0, 0, 0], "odd": [1, 1, 1] } ],
//!   "materials": [ { "name": "ground", "type": "lambertian", "albedo": "floor" } ],
//!   "objects":   [ { "type": "sphere", "center": [0, -100, 0], "radius": 100,
//!                    "material": "ground" } ]
//! }
//! ```
//!
//! Colour fields take either an `[r, g, b]` triple, a single number, or the
//! name of a texture. A name that is not a texture is loaded as an image.
//! Metal and composite `roughness` and light `strength` are colour fields too,
//! read as the mean of their channels.
//! Relative asset paths are resolved against the directory of the scene file.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use glam::{Affine3A, Vec3, Vec3A};
use rand::{rngs::SmallRng, SeedableRng};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    camera::Camera,
    color::Color,
    film::{self, FilmDescriptor},
    hittables::{
        euler_rotation, AxisRect, ConstantMedium, Cuboid, Geometry, GeometryId, MeshImporter, Sphere,
        Transform, Triangle,
    },
    material::{Material, MaterialId},
    textures::{Checkered, EnvironmentMap, ImageMap, Texture, TextureId},
    world::{World, WorldBuilder},
};

/// Seed of the generator that picks BVH split axes, fixed so a scene always
/// builds the same hierarchy.
const BUILD_SEED: u64 = 0x5EED;

/// Reasons a scene description is rejected.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("could not read scene {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed scene description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate {kind} name `{name}`")]
    Duplicate { kind: &'static str, name: String },
    #[error("{field} refers to unknown material `{name}`")]
    UnknownMaterial { field: String, name: String },
    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl SceneError {
    fn invalid(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// Everything a render needs, produced by [load].
#[derive(Debug)]
pub struct LoadedScene {
    pub world: World,
    pub camera: Camera,
    pub film: FilmDescriptor,
}

/// Reads and builds the scene at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<LoadedScene, SceneError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_owned(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let scene = parse(&text, base_dir)?;
    log::info!("Loaded scene {}", path.display());
    Ok(scene)
}

/// Builds a scene from its JSON text, resolving asset paths against `base_dir`.
pub fn parse(text: &str, base_dir: &Path) -> Result<LoadedScene, SceneError> {
    let desc: SceneDesc = serde_json::from_str(text)?;
    SceneLoader::new(base_dir).build(desc)
}

// ----------------------------------------------------------------------------
// File format

#[derive(Debug, Deserialize)]
struct SceneDesc {
    film: FilmDesc,
    camera: CameraDesc,
    #[serde(default)]
    textures: Vec<TextureDesc>,
    #[serde(default)]
    materials: Vec<MaterialDesc>,
    #[serde(default)]
    objects: Vec<ObjectDesc>,
}

#[derive(Debug, Deserialize)]
struct FilmDesc {
    width: u32,
    height: u32,
    samples: u32,
    output: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CameraDesc {
    position: [f32; 3],
    look_at: [f32; 3],
    #[serde(default = "default_up")]
    up: [f32; 3],
    fov: f32,
    #[serde(default)]
    aperture: f32,
    /// Defaults to the distance to `look_at`
    focal_distance: Option<f32>,
    background: Option<Value>,
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

/// A colour given inline or by texture name.
///
/// Colour fields are kept as raw JSON while parsing and read with
/// [TextureRef::from_json], so a malformed value reports the field it came from.
#[derive(Debug, Clone)]
enum TextureRef {
    Scalar(f32),
    Rgb([f32; 3]),
    Name(String),
}

impl TextureRef {
    fn from_json(field: &str, value: &Value) -> Result<Self, SceneError> {
        let mismatch = || {
            SceneError::invalid(
                field,
                format!("expected a number, an [r, g, b] triple or a texture name, found `{value}`"),
            )
        };
        match value {
            Value::Number(number) => number.as_f64().map(|x| Self::Scalar(x as f32)).ok_or_else(mismatch),
            Value::String(name) => Ok(Self::Name(name.clone())),
            Value::Array(items) => match items.as_slice() {
                [r, g, b] => match (r.as_f64(), g.as_f64(), b.as_f64()) {
                    (Some(r), Some(g), Some(b)) => Ok(Self::Rgb([r as f32, g as f32, b as f32])),
                    _ => Err(mismatch()),
                },
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextureDesc {
    name: String,
    #[serde(flatten)]
    kind: TextureKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TextureKind {
    Solid {
        #[serde(alias = "color")]
        colour: [f32; 3],
    },
    Image {
        path: PathBuf,
    },
    Checkered {
        even: Value,
        odd: Value,
    },
    Environment {
        path: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct MaterialDesc {
    name: String,
    #[serde(flatten)]
    kind: MaterialKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MaterialKind {
    Lambertian {
        albedo: Value,
    },
    Metal {
        albedo: Value,
        /// Defaults to a perfect mirror
        roughness: Option<Value>,
    },
    Dielectric {
        #[serde(alias = "refract_index")]
        ior: f32,
        #[serde(default)]
        roughness: f32,
    },
    DiffuseLight {
        #[serde(alias = "albedo")]
        emit: Value,
        /// Defaults to 1
        strength: Option<Value>,
    },
    Isotropic {
        albedo: Value,
    },
    Composite {
        albedo: Value,
        roughness: Option<Value>,
        metallness: Value,
    },
}

#[derive(Debug, Deserialize)]
struct ObjectDesc {
    material: String,
    #[serde(default)]
    transform: Option<TransformDesc>,
    #[serde(flatten)]
    shape: ShapeDesc,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    Triangle {
        vertices: [[f32; 3]; 3],
    },
    XyRect {
        x: [f32; 2],
        y: [f32; 2],
        k: f32,
    },
    XzRect {
        x: [f32; 2],
        z: [f32; 2],
        k: f32,
    },
    YzRect {
        y: [f32; 2],
        z: [f32; 2],
        k: f32,
    },
    #[serde(rename = "box")]
    Cuboid {
        min: [f32; 3],
        max: [f32; 3],
    },
    Mesh {
        path: PathBuf,
    },
    /// A constant-density medium filling `boundary`
    Volume {
        boundary: Box<ShapeDesc>,
        density: f32,
    },
}

#[derive(Debug, Default, Deserialize)]
struct TransformDesc {
    /// Euler angles in degrees
    rotate: Option<[f32; 3]>,
    scale: Option<[f32; 3]>,
    translate: Option<[f32; 3]>,
}

impl TransformDesc {
    /// Rotation first, then scale, then translation.
    fn affine(&self) -> Affine3A {
        let rotate = self
            .rotate
            .map_or(Affine3A::IDENTITY, |angles| euler_rotation(Vec3A::from(angles)));
        let scale = self
            .scale
            .map_or(Affine3A::IDENTITY, |factors| Affine3A::from_scale(Vec3::from(factors)));
        let translate = self
            .translate
            .map_or(Affine3A::IDENTITY, |offset| Affine3A::from_translation(Vec3::from(offset)));
        translate * scale * rotate
    }
}

// ----------------------------------------------------------------------------
// Building

/// Turns a parsed description into a [World], one section at a time.
struct SceneLoader<'a> {
    base_dir: &'a Path,
    builder: WorldBuilder,
    textures: HashMap<String, TextureId>,
    materials: HashMap<String, MaterialId>,
    rng: SmallRng,
}

impl<'a> SceneLoader<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            builder: WorldBuilder::new(),
            textures: HashMap::new(),
            materials: HashMap::new(),
            rng: SmallRng::seed_from_u64(BUILD_SEED),
        }
    }

    fn build(mut self, desc: SceneDesc) -> Result<LoadedScene, SceneError> {
        let film = film_descriptor(desc.film)?;

        for texture in desc.textures {
            self.add_texture(texture)?;
        }
        for material in desc.materials {
            self.add_material(material)?;
        }
        if let Some(background) = &desc.camera.background {
            let background = TextureRef::from_json("camera.background", background)?;
            let id = self.background(&background);
            self.builder.set_background(id);
        }
        for (index, object) in desc.objects.into_iter().enumerate() {
            self.add_object(index, object)?;
        }

        let camera = camera(&desc.camera, film.aspect_ratio())?;
        let world = self.builder.build(&mut self.rng);
        Ok(LoadedScene { world, camera, film })
    }

    fn asset_path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    fn add_texture(&mut self, desc: TextureDesc) -> Result<(), SceneError> {
        if self.textures.contains_key(&desc.name) {
            return Err(SceneError::Duplicate {
                kind: "texture",
                name: desc.name,
            });
        }
        let texture = match desc.kind {
            TextureKind::Solid { colour } => Texture::Solid(Color::from_array(colour)),
            TextureKind::Image { path } => Texture::Image(ImageMap::new(self.asset_path(&path))),
            TextureKind::Checkered { even, odd } => {
                let even = self.colour(format!("textures.{}.even", desc.name), &even)?;
                let odd = self.colour(format!("textures.{}.odd", desc.name), &odd)?;
                Texture::Checkered(Checkered::new(even, odd))
            }
            TextureKind::Environment { path } => {
                Texture::Environment(EnvironmentMap::new(self.asset_path(&path)))
            }
        };
        let id = self.builder.add_texture(texture);
        self.textures.insert(desc.name, id);
        Ok(())
    }

    /// Finds or creates the texture behind a colour field.
    fn resolve(&mut self, texture: &TextureRef) -> TextureId {
        match texture {
            TextureRef::Scalar(value) => self.builder.add_texture(Color::splat(*value)),
            TextureRef::Rgb(rgb) => self.builder.add_texture(Color::from_array(*rgb)),
            TextureRef::Name(name) => match self.textures.get(name) {
                Some(&id) => id,
                None => {
                    // not a declared texture, so it names an image file; load it once
                    let image = ImageMap::new(self.asset_path(Path::new(name)));
                    let id = self.builder.add_texture(Texture::Image(image));
                    self.textures.insert(name.clone(), id);
                    id
                }
            },
        }
    }

    /// Reads and resolves the colour field `field`.
    fn colour(&mut self, field: String, value: &Value) -> Result<TextureId, SceneError> {
        let texture = TextureRef::from_json(&field, value)?;
        Ok(self.resolve(&texture))
    }

    /// Like [SceneLoader::colour], with a uniform `default` for an absent field.
    fn colour_or(&mut self, field: String, value: Option<&Value>, default: f32) -> Result<TextureId, SceneError> {
        match value {
            Some(value) => self.colour(field, value),
            None => Ok(self.builder.add_texture(Color::splat(default))),
        }
    }

    /// Like [SceneLoader::resolve], but an unknown name is an environment map.
    fn background(&mut self, texture: &TextureRef) -> TextureId {
        match texture {
            TextureRef::Name(name) if !self.textures.contains_key(name) => {
                let map = EnvironmentMap::new(self.asset_path(Path::new(name)));
                self.builder.add_texture(Texture::Environment(map))
            }
            _ => self.resolve(texture),
        }
    }

    fn add_material(&mut self, desc: MaterialDesc) -> Result<(), SceneError> {
        if self.materials.contains_key(&desc.name) {
            return Err(SceneError::Duplicate {
                kind: "material",
                name: desc.name,
            });
        }
        let field = |key: &str| format!("materials.{}.{key}", desc.name);
        let material = match &desc.kind {
            MaterialKind::Lambertian { albedo } => Material::Lambertian {
                albedo: self.colour(field("albedo"), albedo)?,
            },
            MaterialKind::Metal { albedo, roughness } => Material::Metal {
                albedo: self.colour(field("albedo"), albedo)?,
                roughness: self.colour_or(field("roughness"), roughness.as_ref(), 0.0)?,
            },
            MaterialKind::Dielectric { ior, roughness } => {
                if !(*ior > 0.0) {
                    return Err(SceneError::invalid(field("ior"), "must be greater than 0"));
                }
                Material::Dielectric {
                    refract_index: *ior,
                    roughness: *roughness,
                }
            }
            MaterialKind::DiffuseLight { emit, strength } => Material::DiffuseLight {
                emit: self.colour(field("emit"), emit)?,
                strength: self.colour_or(field("strength"), strength.as_ref(), 1.0)?,
            },
            MaterialKind::Isotropic { albedo } => Material::Isotropic {
                albedo: self.colour(field("albedo"), albedo)?,
            },
            MaterialKind::Composite {
                albedo,
                roughness,
                metallness,
            } => Material::Composite {
                albedo: self.colour(field("albedo"), albedo)?,
                roughness: self.colour_or(field("roughness"), roughness.as_ref(), 0.0)?,
                metallness: self.colour(field("metallness"), metallness)?,
            },
        };
        let id = self.builder.add_material(material);
        self.materials.insert(desc.name, id);
        Ok(())
    }

    fn add_object(&mut self, index: usize, desc: ObjectDesc) -> Result<(), SceneError> {
        let field = format!("objects[{index}]");
        let material = *self
            .materials
            .get(&desc.material)
            .ok_or_else(|| SceneError::UnknownMaterial {
                field: format!("{field}.material"),
                name: desc.material.clone(),
            })?;

        let id = self.add_shape(&field, &desc.shape, material)?;
        match desc.transform {
            Some(transform) => {
                let transform = Transform::new(id, transform.affine())
                    .ok_or_else(|| SceneError::invalid(format!("{field}.transform"), "transform is not invertible"))?;
                self.builder.add_object(transform);
            }
            None => self.builder.place(id),
        }
        Ok(())
    }

    /// Stores the geometry of `shape` without placing it in the scene.
    fn add_shape(&mut self, field: &str, shape: &ShapeDesc, material: MaterialId) -> Result<GeometryId, SceneError> {
        let geometry: Geometry = match shape {
            ShapeDesc::Sphere { center, radius } => Sphere::new(Vec3A::from(*center), *radius, material).into(),
            ShapeDesc::Triangle { vertices: [v0, v1, v2] } => {
                Triangle::new(Vec3A::from(*v0), Vec3A::from(*v1), Vec3A::from(*v2), material).into()
            }
            ShapeDesc::XyRect { x, y, k } => AxisRect::xy((x[0], x[1]), (y[0], y[1]), *k, material).into(),
            ShapeDesc::XzRect { x, z, k } => AxisRect::xz((x[0], x[1]), (z[0], z[1]), *k, material).into(),
            ShapeDesc::YzRect { y, z, k } => AxisRect::yz((y[0], y[1]), (z[0], z[1]), *k, material).into(),
            ShapeDesc::Cuboid { min, max } => Cuboid::new(Vec3A::from(*min), Vec3A::from(*max), material).into(),
            ShapeDesc::Mesh { path } => {
                // one importer per load, nothing is cached between scenes
                let importer = MeshImporter::new();
                importer.load(self.asset_path(path), material, &mut self.rng).into()
            }
            ShapeDesc::Volume { boundary, density } => {
                let boundary = self.add_shape(&format!("{field}.boundary"), boundary, material)?;
                ConstantMedium::new(boundary, *density, material)
                    .map_err(|why| SceneError::invalid(format!("{field}.density"), why))?
                    .into()
            }
        };
        Ok(self.builder.add_geometry(geometry))
    }
}

fn film_descriptor(desc: FilmDesc) -> Result<FilmDescriptor, SceneError> {
    for (field, value) in [
        ("film.width", desc.width),
        ("film.height", desc.height),
        ("film.samples", desc.samples),
    ] {
        if value == 0 {
            return Err(SceneError::invalid(field, "must be greater than 0"));
        }
    }
    film::output_format(&desc.output).map_err(|why| SceneError::invalid("film.output", why))?;
    Ok(FilmDescriptor::new(desc.width, desc.height, desc.samples, desc.output))
}

fn camera(desc: &CameraDesc, aspect_ratio: f32) -> Result<Camera, SceneError> {
    let look_from = Vec3A::from(desc.position);
    let look_at = Vec3A::from(desc.look_at);
    if !(desc.fov > 0.0 && desc.fov < 180.0) {
        return Err(SceneError::invalid("camera.fov", "must be between 0 and 180 degrees"));
    }
    if desc.aperture < 0.0 {
        return Err(SceneError::invalid("camera.aperture", "must not be negative"));
    }
    let focus_dist = match desc.focal_distance {
        Some(distance) if distance > 0.0 => distance,
        Some(_) => return Err(SceneError::invalid("camera.focal_distance", "must be greater than 0")),
        None => look_from.distance(look_at).max(f32::EPSILON),
    };
    Ok(Camera::new(
        look_from,
        look_at,
        Vec3A::from(desc.up),
        desc.fov,
        aspect_ratio,
        desc.aperture,
        focus_dist,
    ))
}
