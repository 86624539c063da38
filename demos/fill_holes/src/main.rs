use argh::FromArgs;
use ndarray::Array2;

use morpho::imgproc::{self, gradient::GradientMode};
use morpho::strel::StructuringElement;

#[derive(FromArgs)]
/// Draw a few rings on a binary grid, fill their holes and print the result
struct Args {
    /// side length of the square grid
    #[argh(option, short = 's', default = "24")]
    size: usize,

    /// outer radius of the rings
    #[argh(option, short = 'r', default = "4")]
    radius: usize,

    /// use the 4-connected cross instead of the 8-connected box
    #[argh(switch, short = 'd')]
    diamond: bool,
}

/// Rings of width one centered on a coarse lattice, the last one left open.
fn draw_rings(size: usize, radius: usize) -> Array2<bool> {
    let step = 2 * radius + 2;
    let centers: Vec<(isize, isize)> = (0..size / step)
        .flat_map(|i| (0..size / step).map(move |j| (i, j)))
        .map(|(i, j)| ((i * step + radius + 1) as isize, (j * step + radius + 1) as isize))
        .collect();
    let open = centers.last().copied();

    Array2::from_shape_fn((size, size), |(y, x)| {
        centers.iter().any(|&(cy, cx)| {
            let d = (y as isize - cy).abs().max((x as isize - cx).abs());
            let gap = Some((cy, cx)) == open && y as isize == cy && x as isize > cx;
            d == radius as isize && !gap
        })
    })
}

fn render(image: &Array2<bool>) -> String {
    image
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|&v| if v { '#' } else { '.' }).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let connectivity = if args.diamond {
        StructuringElement::unit_diamond(2)
    } else {
        StructuringElement::unit_box(2)
    };

    let image = draw_rings(args.size, args.radius);
    log::info!(
        "drawing {} foreground pixels on a {}x{} grid",
        image.iter().filter(|&&v| v).count(),
        args.size,
        args.size
    );

    let filled = imgproc::reconstruct::fill_holes(&image, Some(&connectivity))?;
    log::info!(
        "filled {} hole pixels",
        filled.iter().zip(image.iter()).filter(|(f, i)| **f && !**i).count()
    );

    // outline of the filled shapes, as a grey-level gradient of the 0/255 image
    let grey = filled.mapv(|v| if v { 255u8 } else { 0 });
    let edges = imgproc::gradient::gradient(&grey, &connectivity, GradientMode::Internal)?;
    log::debug!("outline pixels: {}", edges.iter().filter(|&&v| v > 0).count());

    println!("input:\n{}\n", render(&image));
    println!("filled:\n{}", render(&filled));

    Ok(())
}
