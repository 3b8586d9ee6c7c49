use std::cell::Cell;
use std::rc::Rc;

use chip8_vm_core::{BackendError, Frame, Renderer, SCREEN_HEIGHT, SCREEN_WIDTH};
use sdl2::{
    pixels::{Color, PixelFormatEnum},
    render::{Canvas, Texture, TextureCreator},
    video::{Window, WindowContext},
    VideoSubsystem,
};

use crate::color::{Chip8Color, Palette};

/// Open the window, cleared to the background color
pub fn create_canvas(
    video: &VideoSubsystem,
    scale: u32,
    background: Chip8Color,
) -> anyhow::Result<Canvas<Window>> {
    let window = video
        .window(
            "chip8-vm",
            SCREEN_WIDTH as u32 * scale,
            SCREEN_HEIGHT as u32 * scale,
        )
        .position_centered()
        .build()?;

    let mut canvas = window.into_canvas().build()?;
    canvas.set_draw_color(Color::RGB(background.r, background.g, background.b));
    canvas.clear();
    canvas.present();
    Ok(canvas)
}

/// Presents frames through one streaming texture owned for the renderer's lifetime
pub struct SdlRenderer<'a> {
    canvas: Canvas<Window>,
    texture: Texture<'a>,
    palette: Rc<Cell<Palette>>,
    pixels: Vec<Chip8Color>,
}

impl<'a> SdlRenderer<'a> {
    pub fn new(
        canvas: Canvas<Window>,
        texture_creator: &'a TextureCreator<WindowContext>,
        palette: Rc<Cell<Palette>>,
    ) -> anyhow::Result<SdlRenderer<'a>> {
        let texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGBX8888,
            SCREEN_WIDTH as u32,
            SCREEN_HEIGHT as u32,
        )?;

        let background = palette.get().background;
        Ok(SdlRenderer {
            canvas,
            texture,
            palette,
            pixels: vec![background; SCREEN_WIDTH * SCREEN_HEIGHT],
        })
    }
}

impl Renderer for SdlRenderer<'_> {
    fn render(&mut self, frame: &Frame) -> Result<(), BackendError> {
        let palette = self.palette.get();
        for (pixel, lit) in self.pixels.iter_mut().zip(frame.iter().flatten()) {
            *pixel = palette.color(*lit);
        }

        // Copy CHIP-8 display buffer into GPU texture
        self.texture
            .update(None, bytemuck::cast_slice(&self.pixels[..]), SCREEN_WIDTH * 4)?;

        // Copy texture to Canvas, present canvas on screen
        self.canvas.copy(&self.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
