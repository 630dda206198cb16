use criterion::{Criterion, black_box, criterion_group, criterion_main};

use meshforge_core::mesh::generators::{generate_grid, generate_sphere};
use meshforge_core::mesh::{IndexFormat, VertexAttributeFormat, VertexAttributeSemantic};
use meshforge_mesh_tools::{
    ExtraAttribute, NormalMode, compress_mesh_indices, duplicate_mesh, generate_normals,
    interleave_ref, remove_duplicates, remove_duplicates_fuzzy_in_place,
};

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

fn bench_remove_duplicates_exact(c: &mut Criterion) {
    let soup = duplicate_mesh(&generate_grid(1.0, 64));
    c.bench_function("remove_duplicates_grid_64", |b| {
        b.iter(|| black_box(remove_duplicates(black_box(&soup))));
    });
}

fn bench_remove_duplicates_fuzzy(c: &mut Criterion) {
    let positions = duplicate_mesh(&generate_sphere(1.0, 64, 32)).positions3d();
    c.bench_function("remove_duplicates_fuzzy_sphere_64x32", |b| {
        b.iter(|| {
            let mut data = positions.clone();
            black_box(remove_duplicates_fuzzy_in_place(&mut data, black_box(1.0e-5f32)))
        });
    });
}

// ---------------------------------------------------------------------------
// Index compression and interleaving
// ---------------------------------------------------------------------------

fn bench_compress_mesh_indices(c: &mut Criterion) {
    let mesh = generate_sphere(1.0, 64, 32);
    c.bench_function("compress_mesh_indices_sphere_64x32", |b| {
        b.iter(|| black_box(compress_mesh_indices(black_box(&mesh), IndexFormat::Uint8)));
    });
}

fn bench_interleave_with_extra(c: &mut Criterion) {
    let mesh = generate_sphere(1.0, 64, 32);
    let extras = [ExtraAttribute::new(
        VertexAttributeSemantic::Tangent,
        VertexAttributeFormat::Float4,
    )];
    c.bench_function("interleave_ref_sphere_64x32_tangent", |b| {
        b.iter(|| black_box(interleave_ref(black_box(&mesh), &extras)));
    });
}

// ---------------------------------------------------------------------------
// Normals
// ---------------------------------------------------------------------------

fn bench_generate_normals_smooth(c: &mut Criterion) {
    let mesh = generate_sphere(1.0, 64, 32);
    c.bench_function("generate_normals_smooth_sphere_64x32", |b| {
        b.iter(|| black_box(generate_normals(black_box(&mesh), NormalMode::Smooth)));
    });
}

fn bench_generate_normals_flat(c: &mut Criterion) {
    let mesh = generate_grid(1.0, 64);
    c.bench_function("generate_normals_flat_grid_64", |b| {
        b.iter(|| black_box(generate_normals(black_box(&mesh), NormalMode::Flat)));
    });
}

criterion_group!(
    benches,
    bench_remove_duplicates_exact,
    bench_remove_duplicates_fuzzy,
    bench_compress_mesh_indices,
    bench_interleave_with_extra,
    bench_generate_normals_smooth,
    bench_generate_normals_flat,
);
criterion_main!(benches);
