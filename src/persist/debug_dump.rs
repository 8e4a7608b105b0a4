//! Offline-debugging dumps written by render units when enabled in
//! [`VisConfig`]: the fluid and particle inputs of each tile as
//! tab-separated text, and each tile's partial image with its depth buffer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::VisConfig;
use crate::data::fluid::FluidSlice;
use crate::data::image::PartialImage;
use crate::data::particles::ParticleSlice;
use crate::persist::tga::write_tga;
use crate::placement::tiling::TileCoord;
use crate::vis_error::VisError;

/// Which dumps a render unit writes, and where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugDump {
    dir: PathBuf,
    render_data: bool,
    intermediate_images: bool,
}

fn tile_tag(tile: TileCoord) -> String {
    format!("{}-{}-{}", tile.x, tile.y, tile.z)
}

fn create(path: &Path) -> Result<BufWriter<File>, VisError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| VisError::DumpCreate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

impl DebugDump {
    /// `None` when `config` enables no dump.
    pub fn from_config(config: &VisConfig) -> Option<Self> {
        (config.dump_render_data || config.save_intermediate_images).then(|| DebugDump {
            dir: config.resolved_output_dir(),
            render_data: config.dump_render_data,
            intermediate_images: config.save_intermediate_images,
        })
    }

    /// One line per cell: density, pressure, velocity, center, temperature.
    pub fn write_fluid(&self, tile: TileCoord, frame: u64, fluid: &FluidSlice) -> Result<PathBuf, VisError> {
        fluid.validate()?;
        let path = self.dir.join(format!("render.fluid.{frame}.{}", tile_tag(tile)));
        let mut out = create(&path)?;
        for i in 0..fluid.cell_count() {
            let [vx, vy, vz] = fluid.velocity[i];
            let [cx, cy, cz] = fluid.centers[i];
            writeln!(
                out,
                "{}\t{}\t{vx}\t{vy}\t{vz}\t{cx}\t{cy}\t{cz}\t{}",
                fluid.density[i], fluid.pressure[i], fluid.temperature[i]
            )?;
        }
        out.flush()?;
        Ok(path)
    }

    /// One line per particle: id, position, temperature, density.
    pub fn write_particles(
        &self,
        tile: TileCoord,
        frame: u64,
        particles: &ParticleSlice,
    ) -> Result<PathBuf, VisError> {
        particles.validate()?;
        let path = self.dir.join(format!("render.particles.{frame}.{}", tile_tag(tile)));
        let mut out = create(&path)?;
        for i in 0..particles.len() {
            let [x, y, z] = particles.position[i];
            writeln!(
                out,
                "{}\t{x}\t{y}\t{z}\t{}\t{}",
                particles.id[i], particles.temperature[i], particles.density[i]
            )?;
        }
        out.flush()?;
        Ok(path)
    }

    /// The tile's partial image as TGA plus its depth buffer, one value per
    /// line in the same bottom-up row order.
    pub fn write_intermediate(
        &self,
        tile: TileCoord,
        frame: u64,
        image: &PartialImage,
    ) -> Result<(PathBuf, PathBuf), VisError> {
        let tag = tile_tag(tile);
        let rgba_path = self.dir.join(format!("intermediateRGBA.{tag}.{frame:05}.tga"));
        let mut out = create(&rgba_path)?;
        write_tga(&mut out, image)?;
        out.flush()?;
        log::debug!("wrote image {}", rgba_path.display());

        let z_path = self.dir.join(format!("intermediateZ.{tag}.{frame:05}.txt"));
        let mut out = create(&z_path)?;
        let width = image.descriptor().width as usize;
        for row in image.z.chunks(width.max(1)).rev() {
            for z in row {
                writeln!(out, "{z}")?;
            }
        }
        out.flush()?;
        log::debug!("wrote depth {}", z_path.display());
        Ok((rgba_path, z_path))
    }

    /// Write the input dumps this configuration enables. Failures are
    /// logged; they never fail the render.
    pub fn inputs(&self, tile: TileCoord, frame: u64, fluid: &FluidSlice, particles: &ParticleSlice) {
        if !self.render_data {
            return;
        }
        if let Err(e) = self.write_fluid(tile, frame, fluid) {
            log::warn!("tile {tile}: fluid dump failed: {e}");
        }
        if let Err(e) = self.write_particles(tile, frame, particles) {
            log::warn!("tile {tile}: particle dump failed: {e}");
        }
    }

    /// Write the intermediate image if enabled; failures are logged.
    pub fn output(&self, tile: TileCoord, frame: u64, image: &PartialImage) {
        if !self.intermediate_images {
            return;
        }
        if let Err(e) = self.write_intermediate(tile, frame, image) {
            log::warn!("tile {tile}: intermediate image dump failed: {e}");
        }
    }
}
