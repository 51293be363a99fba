//! `Image`: off-screen textures that scripts draw into and blit from.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use mlua::{Lua, MetaMethod, UserData, UserDataMethods, UserDataRef, Value, Variadic};

use luaplayer_core::video::{
    Color, GraphicsEmulator, PixelBuffer, Rect, Texture, blit_copy, blit_within, rgba,
};

use super::{MAX_IMAGE_SIZE, int};
use crate::error::ImageError;

/// Lua handle to a texture. Copies of the handle share texels.
#[derive(Clone)]
pub struct Image(Texture);

impl Image {
    pub fn new(pixels: PixelBuffer) -> Self {
        Self(Texture::new(pixels))
    }

    pub fn texture(&self) -> &Texture {
        &self.0
    }

    fn create_empty(width: i64, height: i64) -> Result<Self, ImageError> {
        let size = |v: i64| usize::try_from(v).ok().filter(|v| (1..=MAX_IMAGE_SIZE).contains(v));
        match (size(width), size(height)) {
            (Some(w), Some(h)) => Ok(Self::new(PixelBuffer::new(w, h))),
            _ => Err(ImageError::Size {
                width: width.max(0) as usize,
                height: height.max(0) as usize,
                max: MAX_IMAGE_SIZE,
            }),
        }
    }

    /// Draw `source` at `(x, y)` inside this image.
    fn blit_from(&self, x: i32, y: i32, source: &Image, args: BlitArgs) {
        let Some((src, dst)) = args.placement(&source.0, x, y) else {
            return;
        };
        let same = self.0.same_as(&source.0);

        if !args.alpha {
            let mut target = self.0.write();
            if same {
                blit_within(&mut target, src, dst);
            } else {
                blit_copy(src, &source.0.read(), dst, &mut target);
            }
            return;
        }

        // The sprite path reads the source while writing the target, so a
        // self-blit samples from a snapshot.
        let source = if same {
            Texture::new(source.0.read().clone())
        } else {
            source.0.clone()
        };
        let (w, h) = (source.width(), source.height());
        let mut gu = GraphicsEmulator::new();
        gu.bind_texture(source, w, h);
        gu.draw_sprite(&mut self.0.write(), src, dst);
    }
}

/// Optional trailing arguments of `blit`: `[sx, sy, w, h] [, alpha]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct BlitArgs {
    pub src: Rect,
    pub alpha: bool,
}

impl BlitArgs {
    pub fn parse(source: &Texture, rest: &[Value]) -> mlua::Result<Self> {
        let region: Option<Vec<i32>> = rest.get(..4).and_then(|r| r.iter().map(int).collect());
        let (src, flag) = match region {
            Some(r) => (Rect::new(r[0], r[1], r[2], r[3]), rest.get(4)),
            None => {
                let full = Rect::new(0, 0, source.width() as i32, source.height() as i32);
                (full, rest.first())
            }
        };
        let alpha = match flag {
            None | Some(Value::Nil) => true,
            Some(Value::Boolean(b)) => *b,
            Some(other) => {
                return Err(mlua::Error::runtime(format!(
                    "blit: expected boolean alpha flag, got {}",
                    other.type_name()
                )));
            }
        };
        Ok(Self { src, alpha })
    }

    /// Source and destination rectangles for a blit to `(x, y)`, with the
    /// source cut to the texture and the destination shifted to match.
    /// `None` when nothing of the source lies inside the texture.
    pub fn placement(&self, source: &Texture, x: i32, y: i32) -> Option<(Rect, Rect)> {
        let bounds = Rect::new(0, 0, source.width() as i32, source.height() as i32);
        let src = self.src.intersect(&bounds)?;
        let dst = Rect::new(x + src.x - self.src.x, y + src.y - self.src.y, src.w, src.h);
        Some((src, dst))
    }
}

/// Decode a PNG into a texture-sized pixel buffer. Palette, grayscale and
/// 16-bit images are expanded to 8-bit RGBA.
pub fn load_png(path: &Path) -> Result<PixelBuffer, ImageError> {
    let mut decoder = png::Decoder::new(BufReader::new(File::open(path)?));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    let (width, height) = (info.width as usize, info.height as usize);
    if !(1..=MAX_IMAGE_SIZE).contains(&width) || !(1..=MAX_IMAGE_SIZE).contains(&height) {
        return Err(ImageError::Size {
            width,
            height,
            max: MAX_IMAGE_SIZE,
        });
    }
    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => return Err(ImageError::Format(other)),
    };

    let mut pixels = PixelBuffer::new(width, height);
    for y in 0..height {
        let line = &buf[y * info.line_size..][..width * channels];
        let row = pixels.row_mut(y);
        for (dst, px) in row.iter_mut().zip(line.chunks_exact(channels)) {
            *dst = match *px {
                [g] => rgba(g, g, g, 0xFF),
                [g, a] => rgba(g, g, g, a),
                [r, g, b] => rgba(r, g, b, 0xFF),
                [r, g, b, a] => rgba(r, g, b, a),
                _ => 0,
            };
        }
    }
    Ok(pixels)
}

impl UserData for Image {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("width", |_, this, ()| Ok(this.0.width()));
        methods.add_method("height", |_, this, ()| Ok(this.0.height()));

        methods.add_method("clear", |_, this, color: Option<Color>| {
            this.0.write().fill(color.unwrap_or(0));
            Ok(())
        });

        methods.add_method("pixel", |_, this, (x, y, color): (f64, f64, Option<Color>)| {
            let (x, y) = (x as i32, y as i32);
            match color {
                Some(color) => {
                    this.0.write().set(x, y, color);
                    Ok(None)
                }
                None => Ok(this.0.read().get(x, y)),
            }
        });

        methods.add_method(
            "blit",
            |_, this, (x, y, source, rest): (f64, f64, UserDataRef<Image>, Variadic<Value>)| {
                let args = BlitArgs::parse(&source.0, &rest)?;
                this.blit_from(x as i32, y as i32, &source, args);
                Ok(())
            },
        );

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("Image({}x{})", this.0.width(), this.0.height()))
        });
    }
}

pub(super) fn install(lua: &Lua) -> mlua::Result<()> {
    let table = lua.create_table()?;

    table.set(
        "createEmpty",
        lua.create_function(|_, (w, h): (i64, i64)| {
            Image::create_empty(w, h).map_err(mlua::Error::external)
        })?,
    )?;

    table.set(
        "load",
        lua.create_function(|_, path: String| {
            let pixels = load_png(Path::new(&path)).map_err(|err| {
                mlua::Error::runtime(format!("Image.load({path}): {err}"))
            })?;
            Ok(Image::new(pixels))
        })?,
    )?;

    lua.globals().set("Image", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(w: usize, h: usize, color: Color) -> Image {
        let mut pixels = PixelBuffer::new(w, h);
        pixels.fill(color);
        Image::new(pixels)
    }

    #[test]
    fn parse_defaults_to_whole_image_with_alpha() {
        let img = filled(8, 4, 0);
        let args = BlitArgs::parse(img.texture(), &[]).unwrap();
        assert_eq!(args, BlitArgs { src: Rect::new(0, 0, 8, 4), alpha: true });

        let args = BlitArgs::parse(img.texture(), &[Value::Boolean(false)]).unwrap();
        assert!(!args.alpha);
    }

    #[test]
    fn parse_source_region() {
        let img = filled(8, 4, 0);
        let rest = [
            Value::Integer(1),
            Value::Number(2.7),
            Value::Integer(3),
            Value::Integer(2),
            Value::Boolean(false),
        ];
        let args = BlitArgs::parse(img.texture(), &rest).unwrap();
        assert_eq!(args, BlitArgs { src: Rect::new(1, 2, 3, 2), alpha: false });
    }

    #[test]
    fn self_blit_uses_a_snapshot() {
        let img = filled(4, 1, 0xFF00_0000);
        img.texture().write().set(0, 0, 0xFF00_00AA);
        let args = BlitArgs { src: Rect::new(0, 0, 2, 1), alpha: true };
        img.blit_from(1, 0, &img.clone(), args);
        let px = img.texture().read();
        assert_eq!(px.row(0), &[0xFF00_00AA, 0xFF00_00AA, 0xFF00_0000, 0xFF00_0000]);
    }

    #[test]
    fn copy_blit_ignores_alpha() {
        let dst = filled(2, 2, 0xFFFF_FFFF);
        let src = filled(2, 2, 0x0000_0000);
        dst.blit_from(0, 0, &src, BlitArgs { src: Rect::new(0, 0, 1, 1), alpha: false });
        assert_eq!(dst.texture().read().get(0, 0), Some(0));
        assert_eq!(dst.texture().read().get(1, 1), Some(0xFFFF_FFFF));
    }

    #[test]
    fn placement_cuts_source_to_the_texture() {
        let img = filled(4, 4, 0);
        let args = BlitArgs { src: Rect::new(-2, 1, 4, 8), alpha: true };
        let (src, dst) = args.placement(img.texture(), 10, 20).unwrap();
        assert_eq!(src, Rect::new(0, 1, 2, 3));
        assert_eq!(dst, Rect::new(12, 20, 2, 3));

        let outside = BlitArgs { src: Rect::new(4, 0, 2, 2), alpha: true };
        assert_eq!(outside.placement(img.texture(), 0, 0), None);
    }

    #[test]
    fn oversized_source_region_blits_alike_with_and_without_alpha() {
        let src = filled(2, 2, 0xFF00_00FF);
        src.texture().write().set(1, 1, 0xFF00_FF00);
        let region = Rect::new(-1, 0, 4, 3);

        let with_alpha = filled(6, 6, 0xFF00_0000);
        with_alpha.blit_from(1, 1, &src, BlitArgs { src: region, alpha: true });
        let copied = filled(6, 6, 0xFF00_0000);
        copied.blit_from(1, 1, &src, BlitArgs { src: region, alpha: false });

        let a = with_alpha.texture().read();
        let b = copied.texture().read();
        assert_eq!(a.pixels(), b.pixels());
        // The image lands one column right of the requested origin and
        // nothing is drawn for the region outside it.
        assert_eq!(a.get(2, 1), Some(0xFF00_00FF));
        assert_eq!(a.get(3, 2), Some(0xFF00_FF00));
        assert_eq!(a.get(1, 1), Some(0xFF00_0000));
        assert_eq!(a.get(4, 1), Some(0xFF00_0000));
        assert_eq!(a.get(2, 3), Some(0xFF00_0000));
    }

    #[test]
    fn create_empty_checks_size() {
        assert!(Image::create_empty(512, 1).is_ok());
        assert!(matches!(Image::create_empty(0, 4), Err(ImageError::Size { .. })));
        assert!(matches!(Image::create_empty(513, 4), Err(ImageError::Size { .. })));
    }
}
