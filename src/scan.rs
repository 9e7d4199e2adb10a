//! Reachability scanning: the two-queue worklist engine.
//!
//! Compiled code and embedded UI documents are walked in lockstep: one
//! queue of type ids, one queue of container part positions, both
//! feeding each other through shared mark sets. A type marked used for
//! the first time enqueues its bound document; a document record naming
//! a type enqueues that type. Marking is idempotent and every node is
//! enqueued at most once, so termination does not depend on the graph
//! being acyclic.
//!
//! Queue draining order only affects log ordering, never the resulting
//! reachable set.
//!
//! The one structural mutation performed here is eager attribute
//! removal: attributes whose type lives in a configured namespace are
//! struck from their owner as the owner is walked, instead of being
//! marked used.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info};

use crate::assembly::{
    Assembly, AttributeArg, CustomAttribute, Operand, TypeId, TypeRef,
};
use crate::baml::{resource_path_target, BamlRecord};
use crate::entry::EntryPoints;
use crate::index::{BamlIndex, TypeIndex};

/// Everything the scan proved used. Consumed by the classifier and the
/// sweeps; marking is a set, so re-running a scan over the same entry
/// points reproduces the same result.
#[derive(Debug, Default)]
pub struct UsageScan {
    /// Types proven reachable.
    pub used_types: HashSet<TypeId>,
    /// Managed assemblies resolved-to during the scan, by name.
    pub used_assembly_refs: HashSet<String>,
    /// Native modules bound by reachable platform-invoke methods.
    pub used_module_refs: HashSet<String>,
    /// Container parts holding reachable documents, by position.
    pub used_documents: HashSet<usize>,
    /// Non-document container parts referenced from document records,
    /// by original part name.
    pub used_resource_names: HashSet<String>,
}

impl UsageScan {
    pub fn is_type_used(&self, id: TypeId) -> bool {
        self.used_types.contains(&id)
    }

    /// Pre-seed an assembly reference as used. The reference sweep
    /// keeps exactly what was recorded here, so structurally required
    /// references (the runtime's root library) must be seeded by the
    /// caller if the scan would not find them.
    pub fn seed_assembly_ref(&mut self, name: impl Into<String>) {
        self.used_assembly_refs.insert(name.into());
    }
}

/// The worklist scanner. Holds the assembly mutably for the duration of
/// the scan because attribute removal is part of walking.
pub struct Scanner<'a> {
    assembly: &'a mut Assembly,
    types: &'a TypeIndex,
    bamls: &'a BamlIndex,
    remove_attribute_namespaces: &'a HashSet<String>,
    marks: UsageScan,
    type_queue: VecDeque<TypeId>,
    doc_queue: VecDeque<usize>,
}

impl<'a> Scanner<'a> {
    pub fn new(
        assembly: &'a mut Assembly,
        types: &'a TypeIndex,
        bamls: &'a BamlIndex,
        remove_attribute_namespaces: &'a HashSet<String>,
    ) -> Self {
        Self {
            assembly,
            types,
            bamls,
            remove_attribute_namespaces,
            marks: UsageScan::default(),
            type_queue: VecDeque::new(),
            doc_queue: VecDeque::new(),
        }
    }

    /// Seed marks before the scan runs (always-required references).
    pub fn seed_assembly_ref(&mut self, name: impl Into<String>) {
        self.marks.seed_assembly_ref(name);
    }

    /// Drain both queues to a fixpoint and return the marks.
    pub fn run(mut self, entries: &EntryPoints) -> UsageScan {
        info!("scanning for used classes");

        for &id in &entries.types {
            self.mark_type(id);
        }
        for &part in &entries.documents {
            self.mark_document(part);
        }

        loop {
            if let Some(id) = self.type_queue.pop_front() {
                self.walk_type(id);
                continue;
            }
            if let Some(part) = self.doc_queue.pop_front() {
                self.walk_document(part);
                continue;
            }
            break;
        }

        info!(
            types = self.marks.used_types.len(),
            documents = self.marks.used_documents.len(),
            references = self.marks.used_assembly_refs.len(),
            "scan complete"
        );
        self.marks
    }

    // ---- marking ----------------------------------------------------

    fn mark_type(&mut self, id: TypeId) {
        if !self.marks.used_types.insert(id) {
            return;
        }
        let name = self.assembly.type_def(id).name.clone();
        debug!(type_name = %name, "type used");
        self.type_queue.push_back(id);

        // compiled-code reachability pulls in bound markup
        if let Some(part) = self.bamls.part_for_type(&name) {
            self.mark_document(part);
        }
    }

    fn mark_document(&mut self, part: usize) {
        if self.marks.used_documents.insert(part) {
            debug!(document = %self.bamls.part(part).name, "document used");
            self.doc_queue.push_back(part);
        }
    }

    /// Mark whatever a type reference denotes. Generic instantiations
    /// are walked argument by argument before the definition resolves;
    /// external owners are recorded at whole-assembly granularity and
    /// not walked further; names the index cannot resolve are ignored.
    fn mark_type_ref(&mut self, r: &TypeRef) {
        match r {
            TypeRef::Generic { definition, args } => {
                for arg in args {
                    self.mark_type_ref(arg);
                }
                self.mark_type_ref(definition);
            }
            TypeRef::External { assembly, .. } => self.mark_assembly_ref(assembly),
            TypeRef::Named(name) => {
                if let Some(id) = self.types.get(name) {
                    self.mark_type(id);
                }
            }
        }
    }

    fn mark_assembly_ref(&mut self, name: &str) {
        if !self.marks.used_assembly_refs.contains(name) {
            info!(reference = %name, "reference used");
            self.marks.used_assembly_refs.insert(name.to_string());
        }
    }

    fn mark_module_ref(&mut self, name: String) {
        if !self.marks.used_module_refs.contains(&name) {
            info!(module = %name, "native module used");
            self.marks.used_module_refs.insert(name);
        }
    }

    // ---- code items -------------------------------------------------

    fn walk_type(&mut self, id: TypeId) {
        self.scrub_attributes(id);
        self.walk_base_chain(id);

        let def = self.assembly.type_def(id);
        let mut refs: Vec<TypeRef> = Vec::new();
        refs.extend(def.interfaces.iter().cloned());
        refs.extend(def.fields.iter().map(|f| f.field_type.clone()));
        refs.extend(def.properties.iter().map(|p| p.property_type.clone()));

        let mut pinvokes: Vec<String> = Vec::new();
        let mut operands: Vec<Operand> = Vec::new();
        for method in &def.methods {
            refs.extend(method.parameters.iter().cloned());
            refs.push(method.return_type.clone());
            refs.extend(method.locals.iter().cloned());
            if let Some(module) = &method.pinvoke_module {
                pinvokes.push(module.clone());
            }
            for instruction in &method.body {
                if !matches!(instruction.operand, Operand::None) {
                    operands.push(instruction.operand.clone());
                }
            }
        }

        for r in &refs {
            self.mark_type_ref(r);
        }
        for module in pinvokes {
            self.mark_module_ref(module);
        }
        for operand in &operands {
            self.mark_operand(operand);
        }
    }

    /// Every ancestor must survive even if never directly referenced;
    /// removing the base of a retained type is illegal.
    fn walk_base_chain(&mut self, id: TypeId) {
        let mut current = id;
        loop {
            let Some(base) = self.assembly.type_def(current).base.clone() else {
                break;
            };
            self.mark_type_ref(&base);
            let next = match &base {
                TypeRef::Named(name) => self.types.get(name),
                TypeRef::Generic { definition, .. } => match definition.as_ref() {
                    TypeRef::Named(name) => self.types.get(name),
                    _ => None,
                },
                TypeRef::External { .. } => None,
            };
            match next {
                Some(ancestor) => current = ancestor,
                None => break,
            }
        }
    }

    fn mark_operand(&mut self, operand: &Operand) {
        match operand {
            Operand::Method(m) => {
                self.mark_type_ref(&m.declaring_type);
                self.mark_type_ref(&m.return_type);
                for arg in &m.generic_args {
                    self.mark_type_ref(arg);
                }
                for parameter in &m.parameters {
                    self.mark_type_ref(parameter);
                }
            }
            Operand::Type(t) => {
                self.mark_type_ref(t);
                self.mark_enclosing_chain(t);
            }
            Operand::Field(f) => {
                self.mark_type_ref(&f.declaring_type);
                self.mark_type_ref(&f.field_type);
            }
            Operand::None => {}
        }
    }

    fn mark_enclosing_chain(&mut self, r: &TypeRef) {
        if let TypeRef::Named(name) = r {
            if let Some(id) = self.types.get(name) {
                let mut current = self.assembly.type_def(id).enclosing;
                while let Some(enclosing) = current {
                    self.mark_type(enclosing);
                    current = self.assembly.type_def(enclosing).enclosing;
                }
            }
        }
    }

    /// One pass over every attribute owner of the type: attributes from
    /// the configured namespaces are struck from the owner, everything
    /// else is marked used, including `typeof(..)` constructor
    /// arguments.
    fn scrub_attributes(&mut self, id: TypeId) {
        let mut kept: Vec<TypeRef> = Vec::new();
        let mut struck = 0usize;
        {
            let namespaces = self.remove_attribute_namespaces;
            let def = self.assembly.type_def_mut(id);
            scrub_list(&mut def.custom_attributes, namespaces, &mut kept, &mut struck);
            for field in &mut def.fields {
                scrub_list(&mut field.custom_attributes, namespaces, &mut kept, &mut struck);
            }
            for property in &mut def.properties {
                scrub_list(&mut property.custom_attributes, namespaces, &mut kept, &mut struck);
            }
            for param in &mut def.generic_params {
                scrub_list(&mut param.custom_attributes, namespaces, &mut kept, &mut struck);
            }
            for method in &mut def.methods {
                scrub_list(&mut method.custom_attributes, namespaces, &mut kept, &mut struck);
            }
        }

        if struck > 0 {
            debug!(
                type_name = %self.assembly.type_def(id).name,
                count = struck,
                "attributes stripped"
            );
        }
        for r in kept {
            self.mark_type_ref(&r);
        }
    }

    // ---- document items ---------------------------------------------

    fn walk_document(&mut self, part: usize) {
        let bamls = self.bamls;
        let Some(doc) = bamls.part(part).document.as_ref() else {
            return;
        };
        debug!(document = %bamls.part(part).name, "walking document");

        // prefix mappings are scoped to one document
        let mut prefixes: HashMap<&str, &str> = HashMap::new();
        for record in &doc.records {
            match record {
                BamlRecord::TypeInfo { type_name } => {
                    if let Some(id) = self.types.get(type_name) {
                        self.mark_type(id);
                    }
                }
                BamlRecord::NamespaceMapping {
                    prefix,
                    clr_namespace,
                } => {
                    prefixes.insert(prefix, clr_namespace);
                }
                BamlRecord::Text { value } => self.mark_prefixed_token(&prefixes, value),
                BamlRecord::PropertyValue { value } => {
                    if let Some(path) = resource_path_target(value) {
                        self.mark_container_path(&path);
                    }
                }
                BamlRecord::Other => {}
            }
        }
    }

    /// Resolve a `prefix:Name` token against the active mappings: first
    /// as a type, then (for `Owner.Member` tokens) as the containing
    /// type of a member reference.
    fn mark_prefixed_token(&mut self, prefixes: &HashMap<&str, &str>, value: &str) {
        let Some((prefix, name)) = value.split_once(':') else {
            return;
        };
        let Some(namespace) = prefixes.get(prefix) else {
            return;
        };

        let direct = format!("{namespace}.{name}");
        if let Some(id) = self.types.get(&direct) {
            self.mark_type(id);
            return;
        }
        if let Some((owner, _member)) = name.rsplit_once('.') {
            let qualified = format!("{namespace}.{owner}");
            if let Some(id) = self.types.get(&qualified) {
                self.mark_type(id);
            }
        }
    }

    fn mark_container_path(&mut self, path: &str) {
        let bamls = self.bamls;
        let Some(target) = bamls.part_by_name(path) else {
            return;
        };
        if bamls.part(target).document.is_some() {
            self.mark_document(target);
        } else {
            let name = bamls.part(target).name.clone();
            if self.marks.used_resource_names.insert(name.clone()) {
                debug!(resource = %name, "container resource used");
            }
        }
    }
}

fn scrub_list(
    list: &mut Vec<CustomAttribute>,
    namespaces: &HashSet<String>,
    kept: &mut Vec<TypeRef>,
    struck: &mut usize,
) {
    list.retain(|attribute| {
        if namespaces.contains(attribute.attribute_type.namespace()) {
            *struck += 1;
            false
        } else {
            kept.push(attribute.attribute_type.clone());
            for arg in &attribute.ctor_args {
                if let AttributeArg::Type(t) = arg {
                    kept.push(t.clone());
                }
            }
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{Field, Instruction, Method, MethodRef, TypeDef};
    use crate::baml::{BamlDecoder, BamlDocument};
    use crate::config::DeadcilConfig;
    use crate::entry::resolve_entry_points;
    use crate::error::DeadcilResult;

    struct NoDecoder;

    impl BamlDecoder for NoDecoder {
        fn decode(&self, _name: &str, _blob: &[u8]) -> DeadcilResult<BamlDocument> {
            Ok(BamlDocument::default())
        }
    }

    fn scan(assembly: &mut Assembly, entry: &str) -> UsageScan {
        let types = TypeIndex::build(assembly).unwrap();
        let bamls = BamlIndex::build(assembly, &NoDecoder).unwrap();
        let config = DeadcilConfig {
            entry_points: vec![entry.to_string()],
            ..Default::default()
        };
        let entries = resolve_entry_points(assembly, &types, &bamls, &config).unwrap();
        let namespaces = HashSet::new();
        Scanner::new(assembly, &types, &bamls, &namespaces).run(&entries)
    }

    fn used_names(assembly: &Assembly, marks: &UsageScan) -> HashSet<String> {
        marks
            .used_types
            .iter()
            .map(|&id| assembly.type_def(id).name.clone())
            .collect()
    }

    #[test]
    fn test_base_chain_marked_to_root() {
        let mut asm = Assembly::new("Acme");
        asm.add_type(TypeDef::new("Acme.Root"));
        asm.add_type(TypeDef::new("Acme.Mid").with_base(TypeRef::named("Acme.Root")));
        asm.add_type(TypeDef::new("Acme.Leaf").with_base(TypeRef::named("Acme.Mid")));
        asm.add_type(TypeDef::new("Acme.Unrelated"));

        let marks = scan(&mut asm, "Acme.Leaf");
        let names = used_names(&asm, &marks);
        assert!(names.contains("Acme.Leaf"));
        assert!(names.contains("Acme.Mid"));
        assert!(names.contains("Acme.Root"));
        assert!(!names.contains("Acme.Unrelated"));
    }

    #[test]
    fn test_external_references_recorded_not_walked() {
        let mut asm = Assembly::new("Acme");
        asm.add_type(
            TypeDef::new("Acme.Xml").with_method(
                Method::new("Load").with_instruction(Instruction::call(MethodRef::new(
                    "Parse",
                    TypeRef::external("System.Xml", "System.Xml.XmlDocument"),
                ))),
            ),
        );

        let marks = scan(&mut asm, "Acme.Xml");
        assert!(marks.used_assembly_refs.contains("System.Xml"));
        // the external body contributed no further types
        assert_eq!(marks.used_types.len(), 1);
    }

    #[test]
    fn test_generic_arguments_walked() {
        let mut asm = Assembly::new("Acme");
        asm.add_type(TypeDef::new("Acme.Item"));
        asm.add_type(
            TypeDef::new("Acme.Holder").with_field(Field::new(
                "items",
                TypeRef::generic(
                    TypeRef::external("mscorlib", "System.Collections.Generic.List`1"),
                    vec![TypeRef::named("Acme.Item")],
                ),
            )),
        );

        let marks = scan(&mut asm, "Acme.Holder");
        let names = used_names(&asm, &marks);
        assert!(names.contains("Acme.Item"));
        assert!(marks.used_assembly_refs.contains("mscorlib"));
    }

    #[test]
    fn test_attribute_namespace_stripped_not_marked() {
        let mut asm = Assembly::new("Acme");
        asm.add_type(TypeDef::new("Acme.Annotations.MarkerAttribute"));
        asm.add_type(
            TypeDef::new("Acme.Target").with_attribute(CustomAttribute::new(TypeRef::named(
                "Acme.Annotations.MarkerAttribute",
            ))),
        );

        let types = TypeIndex::build(&asm).unwrap();
        let bamls = BamlIndex::build(&asm, &NoDecoder).unwrap();
        let config = DeadcilConfig {
            entry_points: vec!["Acme.Target".into()],
            remove_attribute_namespaces: vec!["Acme.Annotations".into()],
            ..Default::default()
        };
        let entries = resolve_entry_points(&asm, &types, &bamls, &config).unwrap();
        let namespaces: HashSet<String> =
            config.remove_attribute_namespaces.iter().cloned().collect();
        let marks = Scanner::new(&mut asm, &types, &bamls, &namespaces).run(&entries);

        let names = used_names(&asm, &marks);
        assert!(!names.contains("Acme.Annotations.MarkerAttribute"));
        let target = types.get("Acme.Target").unwrap();
        assert!(asm.type_def(target).custom_attributes.is_empty());
    }

    #[test]
    fn test_type_operand_marks_enclosing_chain() {
        let mut asm = Assembly::new("Acme");
        let outer = asm.add_type(TypeDef::new("Acme.Outer"));
        asm.add_nested_type(outer, TypeDef::new("Acme.Outer/Inner"));
        asm.add_type(
            TypeDef::new("Acme.User").with_method(
                Method::new("Touch")
                    .with_instruction(Instruction::ldtoken(TypeRef::named("Acme.Outer/Inner"))),
            ),
        );

        let marks = scan(&mut asm, "Acme.User");
        let names = used_names(&asm, &marks);
        assert!(names.contains("Acme.Outer/Inner"));
        assert!(names.contains("Acme.Outer"));
    }

    #[test]
    fn test_field_operand_marks_declaring_and_field_type() {
        let mut asm = Assembly::new("Acme");
        asm.add_type(TypeDef::new("Acme.Holder"));
        asm.add_type(TypeDef::new("Acme.Value"));
        asm.add_type(
            TypeDef::new("Acme.Reader").with_method(Method::new("Read").with_instruction(
                Instruction::ldfld(crate::assembly::FieldRef::new(
                    "value",
                    TypeRef::named("Acme.Holder"),
                    TypeRef::named("Acme.Value"),
                )),
            )),
        );

        let marks = scan(&mut asm, "Acme.Reader");
        let names = used_names(&asm, &marks);
        assert!(names.contains("Acme.Holder"));
        assert!(names.contains("Acme.Value"));
    }

    #[test]
    fn test_pinvoke_module_marked() {
        let mut asm = Assembly::new("Acme");
        asm.add_type(
            TypeDef::new("Acme.Native")
                .with_method(Method::new("MessageBeep").with_pinvoke("user32.dll")),
        );

        let marks = scan(&mut asm, "Acme.Native");
        assert!(marks.used_module_refs.contains("user32.dll"));
    }

    #[test]
    fn test_marking_is_idempotent() {
        let mut asm = Assembly::new("Acme");
        asm.add_type(TypeDef::new("Acme.A").with_field(Field::new("b", TypeRef::named("Acme.B"))));
        asm.add_type(TypeDef::new("Acme.B").with_field(Field::new("a", TypeRef::named("Acme.A"))));

        // mutually recursive types terminate and mark both
        let first = scan(&mut asm, "Acme.A");
        let second = scan(&mut asm, "Acme.A");
        assert_eq!(
            used_names(&asm, &first),
            used_names(&asm, &second)
        );
        assert_eq!(first.used_types.len(), 2);
    }
}
