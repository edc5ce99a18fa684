//! Reference conversions, boxing, and unboxing.
//!
//! The implicit direction walks the base closure of the source type; the
//! explicit direction is its mirror plus the interface casts that cannot be
//! ruled out at compile time. Arrays convert covariantly when their element
//! types are reference-convertible and the ranks agree.

use rustc_hash::FxHashSet;
use vesper_core::{TypeFlags, TypeId, TypeKind};

use crate::BindingContext;

/// Whether an implicit reference conversion takes `from` to `to`.
pub(crate) fn has_implicit_reference(ctx: &BindingContext, from: TypeId, to: TypeId) -> bool {
    let reg = ctx.registry();
    let from_ty = reg.type_of(from);
    if !from_ty.is_reference() {
        return false;
    }
    let to_ty = reg.type_of(to);
    if !to_ty.is_reference() {
        return false;
    }
    if to == reg.builtins().object() {
        return true;
    }
    if let (TypeKind::Array { rank: rf }, TypeKind::Array { rank: rt }) = (&from_ty.kind, &to_ty.kind)
    {
        if rf == rt {
            if let (Some(fe), Some(te)) = (from_ty.element_type(), to_ty.element_type()) {
                if fe == te || has_implicit_reference(ctx, fe, te) {
                    return true;
                }
            }
        }
    }
    in_base_closure(ctx, from, to)
}

/// Whether `to` appears in the transitive base-class and interface closure
/// of `from`, with type arguments substituted along the way.
fn in_base_closure(ctx: &BindingContext, from: TypeId, to: TypeId) -> bool {
    let reg = ctx.registry();
    let mut seen: FxHashSet<TypeId> = FxHashSet::default();
    let mut queue = reg.direct_bases(from);
    while let Some(base) = queue.pop() {
        if !seen.insert(base) {
            continue;
        }
        if base == to {
            return true;
        }
        queue.extend(reg.direct_bases(base));
    }
    false
}

/// Whether boxing takes `from` to `to`: a value type to `object` or to an
/// interface it implements. A nullable source boxes its inner value.
pub(crate) fn is_boxing(ctx: &BindingContext, from: TypeId, to: TypeId) -> bool {
    let reg = ctx.registry();
    let from_ty = reg.type_of(from);
    let src = from_ty.nullable_inner().unwrap_or(from);
    let src_ty = reg.type_of(src);
    if !src_ty.is_value() || src_ty.is_nullable() {
        return false;
    }
    let to_ty = reg.type_of(to);
    if !to_ty.is_reference() {
        return false;
    }
    to == reg.builtins().object() || (to_ty.is_interface() && in_base_closure(ctx, src, to))
}

/// Whether unboxing takes `from` to `to`: `object` or an implemented
/// interface back to a value type. A nullable target unboxes to its inner
/// value. Cast-only.
pub(crate) fn is_unboxing(ctx: &BindingContext, from: TypeId, to: TypeId) -> bool {
    let reg = ctx.registry();
    let to_ty = reg.type_of(to);
    let dst = to_ty.nullable_inner().unwrap_or(to);
    let dst_ty = reg.type_of(dst);
    if !dst_ty.is_value() || dst_ty.is_nullable() {
        return false;
    }
    let from_ty = reg.type_of(from);
    if !from_ty.is_reference() {
        return false;
    }
    from == reg.builtins().object()
        || (from_ty.is_interface() && in_base_closure(ctx, dst, from))
}

/// Whether a cast-only reference conversion takes `from` to `to`: the
/// downcast mirror of the implicit direction, the interface casts that
/// might succeed at runtime, and explicit array covariance.
pub(crate) fn has_explicit_reference(ctx: &BindingContext, from: TypeId, to: TypeId) -> bool {
    let reg = ctx.registry();
    let from_ty = reg.type_of(from);
    let to_ty = reg.type_of(to);
    if !from_ty.is_reference() || !to_ty.is_reference() {
        return false;
    }
    if from == reg.builtins().object() {
        return true;
    }
    // Downcast: the source sits somewhere in the target's base closure.
    if in_base_closure(ctx, to, from) {
        return true;
    }
    if let (TypeKind::Array { rank: rf }, TypeKind::Array { rank: rt }) = (&from_ty.kind, &to_ty.kind)
    {
        return rf == rt
            && match (from_ty.element_type(), to_ty.element_type()) {
                (Some(fe), Some(te)) => {
                    has_implicit_reference(ctx, te, fe) || has_explicit_reference(ctx, fe, te)
                }
                _ => false,
            };
    }
    match (from_ty.is_interface(), to_ty.is_interface()) {
        // Between interfaces a runtime type may implement both.
        (true, true) => true,
        // Class to an interface it does not implement: possible for a
        // derived class unless the class is sealed.
        (false, true) => !is_sealed(ctx, from),
        (true, false) => !is_sealed(ctx, to),
        (false, false) => false,
    }
}

fn is_sealed(ctx: &BindingContext, ty: TypeId) -> bool {
    let reg = ctx.registry();
    reg.type_of(ty)
        .symbol
        .and_then(|sym| reg.symbol(sym).as_named_type().map(|t| t.flags))
        .is_some_and(|flags| flags.contains(TypeFlags::SEALED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_registry::SymbolRegistry;

    struct World {
        ctx: BindingContext,
        animal: TypeId,
        dog: TypeId,
        pet: TypeId,
        brick: TypeId,
    }

    fn world() -> World {
        let mut reg = SymbolRegistry::new();
        let global = reg.global_namespace();
        let pet_sym = reg.declare_interface(global, "Pet", &[]).unwrap();
        let pet = reg.symbol(pet_sym).as_named_type().unwrap().ty;
        let animal_sym = reg.declare_class(global, "Animal").unwrap();
        let animal = reg.symbol(animal_sym).as_named_type().unwrap().ty;
        let dog_sym = reg
            .declare_class_with(global, "Dog", Some(animal), &[pet], TypeFlags::SEALED)
            .unwrap();
        let dog = reg.symbol(dog_sym).as_named_type().unwrap().ty;
        let brick_sym = reg
            .declare_class_with(global, "Brick", None, &[], TypeFlags::SEALED)
            .unwrap();
        let brick = reg.symbol(brick_sym).as_named_type().unwrap().ty;
        World {
            ctx: BindingContext::new(reg),
            animal,
            dog,
            pet,
            brick,
        }
    }

    #[test]
    fn upcasts_are_implicit() {
        let w = world();
        let object = w.ctx.registry().builtins().object();
        assert!(has_implicit_reference(&w.ctx, w.dog, w.animal));
        assert!(has_implicit_reference(&w.ctx, w.dog, w.pet));
        assert!(has_implicit_reference(&w.ctx, w.dog, object));
        assert!(!has_implicit_reference(&w.ctx, w.animal, w.dog));
    }

    #[test]
    fn downcasts_are_explicit() {
        let w = world();
        let object = w.ctx.registry().builtins().object();
        assert!(has_explicit_reference(&w.ctx, w.animal, w.dog));
        assert!(has_explicit_reference(&w.ctx, object, w.dog));
        assert!(has_explicit_reference(&w.ctx, w.pet, w.dog));
    }

    #[test]
    fn sealed_classes_reject_unrelated_interface_casts() {
        let w = world();
        // Brick is sealed and does not implement Pet, so the cast can never
        // succeed; an unsealed class might have a derived type that does.
        assert!(!has_explicit_reference(&w.ctx, w.brick, w.pet));
        assert!(!has_explicit_reference(&w.ctx, w.pet, w.brick));
        assert!(has_explicit_reference(&w.ctx, w.animal, w.pet));
    }

    #[test]
    fn array_covariance_follows_elements() {
        let w = world();
        let reg = w.ctx.registry();
        let dogs = reg.array_of(w.dog, 1);
        let animals = reg.array_of(w.animal, 1);
        let grid = reg.array_of(w.dog, 2);
        assert!(has_implicit_reference(&w.ctx, dogs, animals));
        assert!(!has_implicit_reference(&w.ctx, animals, dogs));
        assert!(has_explicit_reference(&w.ctx, animals, dogs));
        assert!(!has_implicit_reference(&w.ctx, grid, animals));

        let object = reg.builtins().object();
        assert!(has_implicit_reference(&w.ctx, dogs, object));
    }

    #[test]
    fn value_types_box_rather_than_convert() {
        let w = world();
        let reg = w.ctx.registry();
        let int32 = reg.builtins().int32();
        let object = reg.builtins().object();
        assert!(!has_implicit_reference(&w.ctx, int32, object));
        assert!(is_boxing(&w.ctx, int32, object));
        assert!(is_unboxing(&w.ctx, object, int32));
        assert!(!is_unboxing(&w.ctx, w.animal, int32));
    }

    #[test]
    fn nullables_box_their_inner_value() {
        let w = world();
        let reg = w.ctx.registry();
        let int32 = reg.builtins().int32();
        let n32 = reg.nullable_of(int32);
        let object = reg.builtins().object();
        assert!(is_boxing(&w.ctx, n32, object));
        assert!(is_unboxing(&w.ctx, object, n32));
    }
}
